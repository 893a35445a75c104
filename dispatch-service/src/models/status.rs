use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DispatchStatus {
    Sent,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobPhase {
    Started,
    Executing,
    Finished,
    Aborted,
}

impl JobPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobPhase::Started => "started",
            JobPhase::Executing => "executing",
            JobPhase::Finished => "finished",
            JobPhase::Aborted => "aborted",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "executing" => JobPhase::Executing,
            "finished" => JobPhase::Finished,
            "aborted" => JobPhase::Aborted,
            _ => JobPhase::Started,
        }
    }
}
