use gatehouse_core::{Principal, Role, SubjectId};

/// Session context for a request (the decoded principal).
///
/// Inserted by the session guards; present for every guarded route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    principal: Principal,
}

impl SessionContext {
    pub fn new(principal: Principal) -> Self {
        Self { principal }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn subject_id(&self) -> &SubjectId {
        &self.principal.subject_id
    }

    pub fn role(&self) -> Role {
        self.principal.role
    }

    pub fn into_principal(self) -> Principal {
        self.principal
    }
}
