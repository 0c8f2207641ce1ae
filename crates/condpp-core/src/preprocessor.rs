use tracing::{debug, trace};

use crate::condition::ConditionStack;
use crate::environment::Environment;
use crate::error::PreprocessError;
use crate::position_map::PositionMap;
use crate::predicate::PredicateEvaluator;
use crate::scanner::DirectiveScanner;
use crate::source_map::SourceMap;
use crate::splice::TextSplicer;

/// Result of a successful preprocessing call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preprocessed {
    pub text: String,
    pub position_map: PositionMap,
    removed_bytes: usize,
}

impl Preprocessed {
    /// Number of source bytes stripped from disabled branches
    pub fn removed_bytes(&self) -> usize {
        self.removed_bytes
    }

    pub fn is_unchanged(&self) -> bool {
        self.removed_bytes == 0
    }

    /// Render the position map as a Source Map v3 document. `source` must be
    /// the text this result was produced from.
    pub fn source_map(
        &self,
        source: &str,
        file: Option<&str>,
        source_name: &str,
        include_content: bool,
    ) -> SourceMap {
        SourceMap::from_position_map(
            &self.position_map,
            source,
            &self.text,
            file,
            source_name,
            include_content,
        )
    }
}

/// Strips disabled conditional branches from source text.
///
/// Holds only the read-only environment, so one instance can be shared by
/// any number of threads.
#[derive(Debug, Clone, Default)]
pub struct Preprocessor {
    env: Environment,
    scanner: DirectiveScanner,
}

impl Preprocessor {
    pub fn new(env: Environment) -> Self {
        Self {
            env,
            scanner: DirectiveScanner::new(),
        }
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    /// Run one preprocessing pass over `source`.
    ///
    /// Directives are handled strictly in source order and the first error
    /// aborts the call; no partial output is ever returned.
    pub fn preprocess(&self, source: &str) -> Result<Preprocessed, PreprocessError> {
        let evaluator = PredicateEvaluator::new(&self.env);
        let mut stack = ConditionStack::new();
        let mut splicer = TextSplicer::new();
        let mut previous_end = 0;

        for directive in self.scanner.directives(source) {
            let directive = directive?;

            // text since the previous directive was under the old state
            if !stack.is_enabled() {
                splicer.mark_disabled(previous_end, directive.start);
            }
            previous_end = directive.end;

            stack.apply(&directive, |predicate| evaluator.evaluate(predicate))?;
            trace!(
                tag = %directive.tag,
                offset = directive.start,
                depth = stack.depth(),
                enabled = stack.is_enabled(),
                "applied directive"
            );
        }

        stack.finish()?;
        if !stack.is_enabled() {
            splicer.mark_disabled(previous_end, source.len());
        }

        let text = splicer.build(source);
        let position_map = PositionMap::build(&splicer.retained(source.len()));
        let removed_bytes = splicer.removed_bytes();
        debug!(
            source_len = source.len(),
            removed_bytes,
            spans = position_map.breakpoints().len(),
            "preprocessed source"
        );

        Ok(Preprocessed {
            text,
            position_map,
            removed_bytes,
        })
    }
}

/// Preprocess `source` against `env`
pub fn preprocess(source: &str, env: &Environment) -> Result<Preprocessed, PreprocessError> {
    Preprocessor::new(env.clone()).preprocess(source)
}
