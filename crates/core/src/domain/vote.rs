use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoteDirection {
    #[serde(rename = "too-high")]
    TooHigh,
    #[serde(rename = "too-low")]
    TooLow,
}

impl VoteDirection {
    /// "Too high" means the team should drop, so it counts against it.
    pub fn delta(self) -> i64 {
        match self {
            Self::TooHigh => -1,
            Self::TooLow => 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitVote {
    pub team_id: String,
    pub vote: VoteDirection,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteStats {
    pub team_id: String,
    pub total: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_submit_vote_body() {
        let body = json!({"teamId": "UIUC", "vote": "too-low", "date": "2025-11-12"});
        let vote: SubmitVote = serde_json::from_value(body).unwrap();
        assert_eq!(vote.team_id, "UIUC");
        assert_eq!(vote.vote, VoteDirection::TooLow);
        assert_eq!(vote.vote.delta(), 1);
    }

    #[test]
    fn rejects_unknown_direction() {
        let body = json!({"teamId": "UIUC", "vote": "sideways", "date": "2025-11-12"});
        assert!(serde_json::from_value::<SubmitVote>(body).is_err());
    }

    #[test]
    fn too_high_counts_against() {
        assert_eq!(VoteDirection::TooHigh.delta(), -1);
    }
}
