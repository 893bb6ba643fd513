use crate::role::Role;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrainingModule {
    Dispatch,
    Broker,
    Compliance,
    Safety,
    Technology,
    Customer,
    Workflow,
    Sms,
}

impl TrainingModule {
    pub const ALL: [TrainingModule; 8] = [
        TrainingModule::Dispatch,
        TrainingModule::Broker,
        TrainingModule::Compliance,
        TrainingModule::Safety,
        TrainingModule::Technology,
        TrainingModule::Customer,
        TrainingModule::Workflow,
        TrainingModule::Sms,
    ];
}

/// Which training curriculum a role may follow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingAccess {
    pub can_access_training: bool,
    pub allowed_modules: Vec<TrainingModule>,
    pub can_view_certificates: bool,
    pub can_manage_training: bool,
    pub can_view_all_progress: bool,
}

impl TrainingAccess {
    fn learner(allowed_modules: &[TrainingModule]) -> Self {
        Self {
            can_access_training: true,
            allowed_modules: allowed_modules.to_vec(),
            can_view_certificates: true,
            can_manage_training: false,
            can_view_all_progress: false,
        }
    }

    fn none() -> Self {
        Self {
            can_access_training: false,
            allowed_modules: Vec::new(),
            can_view_certificates: false,
            can_manage_training: false,
            can_view_all_progress: false,
        }
    }

    pub fn allows(&self, module: TrainingModule) -> bool {
        self.can_access_training && self.allowed_modules.contains(&module)
    }
}

/// Training curriculum for `role`.
///
/// Instructors are served by the instructor portal through their `training`
/// capabilities and get no learner curriculum here.
pub fn training_access(role: &Role) -> TrainingAccess {
    use TrainingModule::*;

    match role {
        Role::Admin => TrainingAccess {
            can_manage_training: true,
            can_view_all_progress: true,
            ..TrainingAccess::learner(&TrainingModule::ALL)
        },
        Role::Manager => TrainingAccess {
            can_view_all_progress: true,
            ..TrainingAccess::learner(&TrainingModule::ALL)
        },
        Role::Dispatcher => {
            TrainingAccess::learner(&[Dispatch, Workflow, Compliance, Safety, Technology, Customer])
        }
        Role::Broker => TrainingAccess::learner(&[Broker, Workflow, Compliance, Customer]),
        Role::Driver => TrainingAccess::learner(&[Safety, Compliance, Technology]),
        Role::Instructor | Role::Unprovisioned(_) => TrainingAccess::none(),
    }
}
