use std::collections::HashMap;

use questionnaire_core::model::{Activity, Capability, CapabilitySet, CourseModuleId, UserId};
use storage::Grant;

use crate::error::AccessDenied;

/// Who is making the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserIdentity {
    Guest,
    User(UserId),
}

/// Login and capability checks for an activity context.
pub trait AccessPolicy: Send + Sync {
    /// Confirm the caller is logged in and may enter the activity.
    ///
    /// # Errors
    ///
    /// Returns `AccessDenied::NotLoggedIn` for guests, or
    /// `AccessDenied::NotEnrolled` when the user has no role in the activity.
    fn require_login(
        &self,
        caller: UserIdentity,
        activity: &Activity,
    ) -> Result<UserId, AccessDenied>;

    fn has_capability(&self, user: UserId, activity: &Activity, capability: Capability) -> bool;

    /// # Errors
    ///
    /// Returns `AccessDenied::MissingCapability` when the user lacks `capability`.
    fn require_capability(
        &self,
        user: UserId,
        activity: &Activity,
        capability: Capability,
    ) -> Result<(), AccessDenied> {
        if self.has_capability(user, activity, capability) {
            Ok(())
        } else {
            Err(AccessDenied::MissingCapability(capability))
        }
    }
}

/// Capability grants per user and activity.
#[derive(Debug, Clone, Default)]
pub struct RoleAccessPolicy {
    grants: HashMap<(UserId, CourseModuleId), CapabilitySet>,
}

impl RoleAccessPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_grants(grants: impl IntoIterator<Item = Grant>) -> Self {
        grants.into_iter().fold(Self::new(), |policy, grant| {
            policy.grant(grant.user_id, grant.course_module_id, grant.capabilities)
        })
    }

    #[must_use]
    pub fn grant(
        mut self,
        user: UserId,
        activity: CourseModuleId,
        capabilities: CapabilitySet,
    ) -> Self {
        self.grants.insert((user, activity), capabilities);
        self
    }
}

impl AccessPolicy for RoleAccessPolicy {
    fn require_login(
        &self,
        caller: UserIdentity,
        activity: &Activity,
    ) -> Result<UserId, AccessDenied> {
        match caller {
            UserIdentity::Guest => Err(AccessDenied::NotLoggedIn),
            UserIdentity::User(user) => {
                if self.grants.contains_key(&(user, activity.course_module_id)) {
                    Ok(user)
                } else {
                    Err(AccessDenied::NotEnrolled)
                }
            }
        }
    }

    fn has_capability(&self, user: UserId, activity: &Activity, capability: Capability) -> bool {
        self.grants
            .get(&(user, activity.course_module_id))
            .is_some_and(|caps| caps.contains(capability))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use questionnaire_core::model::{
        CourseId, Question, QuestionId, QuestionKind, Questionnaire, QuestionnaireId,
    };

    fn activity() -> Activity {
        let questionnaire = Questionnaire::new(
            QuestionnaireId::new(1),
            "Survey",
            vec![Question::new(QuestionId::new(1), QuestionKind::Text, "q", "?")],
            vec![vec![QuestionId::new(1)]],
        )
        .unwrap();
        Activity {
            course_id: CourseId::new(1),
            course_module_id: CourseModuleId::new(9),
            questionnaire,
        }
    }

    #[test]
    fn guests_must_log_in() {
        let policy = RoleAccessPolicy::new();
        assert_eq!(
            policy.require_login(UserIdentity::Guest, &activity()),
            Err(AccessDenied::NotLoggedIn)
        );
    }

    #[test]
    fn users_without_a_role_are_not_enrolled() {
        let policy = RoleAccessPolicy::new().grant(
            UserId::new(1),
            CourseModuleId::new(10),
            CapabilitySet::student(),
        );
        assert_eq!(
            policy.require_login(UserIdentity::User(UserId::new(1)), &activity()),
            Err(AccessDenied::NotEnrolled)
        );
    }

    #[test]
    fn capability_checks_follow_grants() {
        let user = UserId::new(1);
        let policy = RoleAccessPolicy::from_grants([Grant {
            user_id: user,
            course_module_id: CourseModuleId::new(9),
            capabilities: CapabilitySet::student().without(Capability::Submit),
        }]);
        let activity = activity();

        assert_eq!(policy.require_login(UserIdentity::User(user), &activity), Ok(user));
        assert!(policy.require_capability(user, &activity, Capability::View).is_ok());
        assert_eq!(
            policy.require_capability(user, &activity, Capability::Submit),
            Err(AccessDenied::MissingCapability(Capability::Submit))
        );
    }
}
