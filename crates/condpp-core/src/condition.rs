//! Nesting state machine for conditional blocks.
//!
//! `enabled` is always the conjunction of every open block's taken branch, so
//! a nested block can only be enabled when all of its ancestors are.

use crate::directive::{Directive, DirectiveTag};
use crate::error::PreprocessError;
use crate::predicate::PredicateError;

/// One open `//#if` block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConditionFrame {
    /// Enable state of the enclosing scope when the block was opened
    pub parent_enabled: bool,
    /// Offset of the opening `//#if`, for unterminated-block diagnostics
    pub opened_at: usize,
}

/// Snapshot of the machine between two directives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluationState {
    pub current_enabled: bool,
    pub last_branch_matched: bool,
}

impl Default for EvaluationState {
    fn default() -> Self {
        Self {
            current_enabled: true,
            last_branch_matched: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConditionStack {
    frames: Vec<ConditionFrame>,
    state: EvaluationState,
}

impl ConditionStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Whether text after the last applied directive is kept
    pub fn is_enabled(&self) -> bool {
        self.state.current_enabled
    }

    pub fn state(&self) -> EvaluationState {
        self.state
    }

    /// Apply one directive. `evaluate` is only called for predicates whose
    /// value can still matter.
    pub fn apply<F>(&mut self, directive: &Directive, mut evaluate: F) -> Result<(), PreprocessError>
    where
        F: FnMut(&str) -> Result<bool, PredicateError>,
    {
        let offset = directive.start;
        let mut eval_predicate = |tag: DirectiveTag| -> Result<bool, PreprocessError> {
            let predicate = directive
                .predicate
                .as_deref()
                .ok_or(PreprocessError::MissingPredicate { tag, offset })?;
            evaluate(predicate).map_err(|source| PreprocessError::PredicateEvaluation {
                predicate: predicate.to_string(),
                offset,
                source,
            })
        };

        match directive.tag {
            DirectiveTag::If => {
                let result = eval_predicate(DirectiveTag::If)?;
                self.frames.push(ConditionFrame {
                    parent_enabled: self.state.current_enabled,
                    opened_at: offset,
                });
                self.state.current_enabled &= result;
                self.state.last_branch_matched = result;
            }
            DirectiveTag::Elif => {
                let parent_enabled = self.top(directive)?.parent_enabled;
                if self.state.last_branch_matched {
                    self.state.current_enabled = false;
                } else {
                    let result = eval_predicate(DirectiveTag::Elif)?;
                    self.state.current_enabled = parent_enabled && result;
                    self.state.last_branch_matched = result;
                }
            }
            DirectiveTag::Else => {
                let parent_enabled = self.top(directive)?.parent_enabled;
                self.state.current_enabled = parent_enabled && !self.state.last_branch_matched;
            }
            DirectiveTag::Endif => {
                let frame = self.top(directive)?;
                self.frames.pop();
                self.state.current_enabled = frame.parent_enabled;
                // the enclosing chain always continues as "nothing matched"
                self.state.last_branch_matched = false;
            }
        }

        Ok(())
    }

    /// Check that every block was closed
    pub fn finish(&self) -> Result<(), PreprocessError> {
        match self.frames.last() {
            None => Ok(()),
            Some(frame) => Err(PreprocessError::UnterminatedBlock {
                open_blocks: self.frames.len(),
                offset: frame.opened_at,
            }),
        }
    }

    fn top(&self, directive: &Directive) -> Result<ConditionFrame, PreprocessError> {
        self.frames
            .last()
            .copied()
            .ok_or(PreprocessError::UnexpectedDirective {
                tag: directive.tag,
                offset: directive.start,
            })
    }
}
