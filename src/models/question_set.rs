use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionSet {
    pub technical: Vec<String>,
    pub behavioral: Vec<String>,
    pub job_specific: Vec<String>,
}

impl QuestionSet {
    pub fn is_complete(&self) -> bool {
        !self.technical.is_empty() && !self.behavioral.is_empty() && !self.job_specific.is_empty()
    }
}
