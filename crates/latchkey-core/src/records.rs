//! Serialized records returned to callers.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::types::{ContinuationToken, Credential};

/// Caller-facing snapshot of a [`Credential`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialRecord {
    pub id: String,
    pub facility_id: u32,
    pub facility_name: String,
    pub is_revoked: bool,
    pub registered_date: String,
}

impl From<&Credential> for CredentialRecord {
    fn from(credential: &Credential) -> Self {
        Self {
            id: credential.id.clone(),
            facility_id: credential.facility_id,
            facility_name: credential.facility_name.clone(),
            is_revoked: credential.is_revoked,
            registered_date: credential.registered_date(),
        }
    }
}

/// Settlement of a registration request.
///
/// Serializes as `{"completed": true, "credential": {..}}` or
/// `{"completed": false, "continuationPoint": ".."}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationResponse {
    /// Registration finished and produced a credential.
    Completed { credential: CredentialRecord },

    /// Registration is paused until the caller picks a second factor.
    Pending {
        continuation_point: ContinuationToken,
    },
}

impl RegistrationResponse {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    /// The credential, if the registration completed.
    pub fn credential(&self) -> Option<&CredentialRecord> {
        match self {
            Self::Completed { credential } => Some(credential),
            Self::Pending { .. } => None,
        }
    }

    /// The continuation point, if the registration is paused.
    pub fn continuation_point(&self) -> Option<&ContinuationToken> {
        match self {
            Self::Pending { continuation_point } => Some(continuation_point),
            Self::Completed { .. } => None,
        }
    }
}

impl Serialize for RegistrationResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("RegistrationResponse", 2)?;
        match self {
            Self::Completed { credential } => {
                state.serialize_field("completed", &true)?;
                state.serialize_field("credential", credential)?;
            }
            Self::Pending { continuation_point } => {
                state.serialize_field("completed", &false)?;
                state.serialize_field("continuationPoint", continuation_point)?;
            }
        }
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn credential() -> Credential {
        Credential {
            id: "c1".into(),
            facility_id: 1,
            facility_name: "HQ".into(),
            is_revoked: false,
            registered_at: Utc.with_ymd_and_hms(2024, 3, 7, 15, 4, 0).unwrap(),
        }
    }

    #[test]
    fn test_completed_shape() {
        let record = CredentialRecord::from(&credential());
        let response = RegistrationResponse::Completed {
            credential: record.clone(),
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            json!({
                "completed": true,
                "credential": {
                    "id": "c1",
                    "facilityId": 1,
                    "facilityName": "HQ",
                    "isRevoked": false,
                    "registeredDate": record.registered_date,
                }
            })
        );
        assert_eq!(response.credential(), Some(&record));
        assert!(response.continuation_point().is_none());
    }

    #[test]
    fn test_pending_shape() {
        let response = RegistrationResponse::Pending {
            continuation_point: ContinuationToken::from("tok-1"),
        };
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"completed": false, "continuationPoint": "tok-1"})
        );
        assert!(!response.is_completed());
    }
}
