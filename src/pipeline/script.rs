//! The fixed LLM pipeline choreography as data.

use super::stage::Stage;
use std::time::Duration;

pub const STATUS_STARTING: &str = "Starting LLM processing...";
pub const STATUS_TOKENIZING: &str = "Tokenizing input text";
pub const STATUS_EMBEDDING: &str = "Converting tokens to embeddings";
pub const STATUS_CONTEXT: &str = "Checking context window";
pub const STATUS_ATTENTION: &str = "Processing attention weights";
pub const STATUS_KNOWLEDGE: &str = "Accessing knowledge base";
pub const STATUS_OUTPUT: &str = "Generating output text";
pub const STATUS_COMPLETE: &str = "Processing complete";

/// Upper bound shared by both gauges.
pub const GAUGE_MAX: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gauge {
    Tokenize,
    Attention,
}

impl Gauge {
    pub fn label(&self) -> &'static str {
        match self {
            Gauge::Tokenize => "Tokenization Progress",
            Gauge::Attention => "Attention Score",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Animate the marker to `to` over `duration`.
    Move {
        to: Stage,
        duration: Duration,
        status: Option<&'static str>,
    },
    /// Raise `gauge` from 0 to 100 by `delta`, waiting `interval` after each value.
    Ramp {
        gauge: Gauge,
        delta: u8,
        interval: Duration,
    },
    Pause {
        duration: Duration,
        status: Option<&'static str>,
    },
}

impl Step {
    fn move_to(to: Stage, millis: u64, status: Option<&'static str>) -> Self {
        Step::Move {
            to,
            duration: Duration::from_millis(millis),
            status,
        }
    }

    fn ramp(gauge: Gauge, delta: u8, millis: u64) -> Self {
        Step::Ramp {
            gauge,
            delta,
            interval: Duration::from_millis(millis),
        }
    }

    fn pause(millis: u64, status: Option<&'static str>) -> Self {
        Step::Pause {
            duration: Duration::from_millis(millis),
            status,
        }
    }

    pub fn status(&self) -> Option<&'static str> {
        match self {
            Step::Move { status, .. } | Step::Pause { status, .. } => *status,
            Step::Ramp { .. } => None,
        }
    }

    /// Time the step keeps the sequencer suspended.
    pub fn duration(&self) -> Duration {
        match self {
            Step::Move { duration, .. } | Step::Pause { duration, .. } => *duration,
            Step::Ramp {
                delta, interval, ..
            } => *interval * ramp_values(*delta).len() as u32,
        }
    }
}

/// Values a ramp publishes: 0, delta, 2*delta, ... capped at 100.
pub fn ramp_values(delta: u8) -> Vec<u8> {
    let mut values = vec![0];
    if delta == 0 {
        return values;
    }
    let mut value = 0u8;
    while value < GAUGE_MAX {
        value = value.saturating_add(delta).min(GAUGE_MAX);
        values.push(value);
    }
    values
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    steps: Vec<Step>,
}

impl Script {
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    pub fn llm_pipeline() -> Self {
        Self::new(vec![
            Step::pause(0, Some(STATUS_STARTING)),
            Step::move_to(Stage::Tokenizer, 1000, Some(STATUS_TOKENIZING)),
            Step::ramp(Gauge::Tokenize, 20, 200),
            Step::move_to(Stage::EmbeddingLayer, 1000, Some(STATUS_EMBEDDING)),
            Step::move_to(Stage::ContextWindow, 500, Some(STATUS_CONTEXT)),
            Step::pause(500, None),
            Step::move_to(Stage::EmbeddingLayer, 500, None),
            Step::move_to(Stage::AttentionMechanism, 1000, Some(STATUS_ATTENTION)),
            Step::ramp(Gauge::Attention, 10, 100),
            Step::move_to(Stage::KnowledgeBase, 1000, Some(STATUS_KNOWLEDGE)),
            Step::pause(1000, None),
            Step::move_to(Stage::AttentionMechanism, 1000, None),
            Step::move_to(Stage::OutputText, 1000, Some(STATUS_OUTPUT)),
            Step::pause(0, Some(STATUS_COMPLETE)),
        ])
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn total_duration(&self) -> Duration {
        self.steps.iter().map(Step::duration).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ramp_values() {
        assert_eq!(ramp_values(20), vec![0, 20, 40, 60, 80, 100]);
        assert_eq!(
            ramp_values(10),
            vec![0, 10, 20, 30, 40, 50, 60, 70, 80, 90, 100]
        );
        assert_eq!(ramp_values(30), vec![0, 30, 60, 90, 100]);
        assert_eq!(ramp_values(0), vec![0]);
        assert_eq!(ramp_values(255), vec![0, 100]);
    }

    #[test]
    fn test_pipeline_route() {
        let script = Script::llm_pipeline();
        let route: Vec<Stage> = script
            .steps()
            .iter()
            .filter_map(|s| match s {
                Step::Move { to, .. } => Some(*to),
                _ => None,
            })
            .collect();

        assert_eq!(
            route,
            vec![
                Stage::Tokenizer,
                Stage::EmbeddingLayer,
                Stage::ContextWindow,
                Stage::EmbeddingLayer,
                Stage::AttentionMechanism,
                Stage::KnowledgeBase,
                Stage::AttentionMechanism,
                Stage::OutputText,
            ]
        );
    }

    #[test]
    fn test_pipeline_statuses_in_order() {
        let statuses: Vec<&str> = Script::llm_pipeline()
            .steps()
            .iter()
            .filter_map(Step::status)
            .collect();

        assert_eq!(
            statuses,
            vec![
                STATUS_STARTING,
                STATUS_TOKENIZING,
                STATUS_EMBEDDING,
                STATUS_CONTEXT,
                STATUS_ATTENTION,
                STATUS_KNOWLEDGE,
                STATUS_OUTPUT,
                STATUS_COMPLETE,
            ]
        );
    }

    #[test]
    fn test_pipeline_total_duration() {
        let script = Script::llm_pipeline();
        assert_eq!(script.total_duration(), Duration::from_millis(10_800));
        assert_eq!(
            script.steps()[2].duration(),
            Duration::from_millis(1200),
            "tokenize ramp waits after each of its six values"
        );
    }
}
