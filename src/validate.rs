use crate::error::ValidationError;
use crate::model::{FeeStructure, Parent, Role};

pub fn fee_structure(record: &FeeStructure) -> Result<FeeStructure, ValidationError> {
    let class_name = record.class_name.trim();
    if class_name.is_empty() {
        return Err(ValidationError::EmptyField("className"));
    }
    Ok(FeeStructure {
        class_name: class_name.to_string(),
        ..record.clone()
    })
}

pub fn parent(record: &Parent) -> Result<Parent, ValidationError> {
    let name = record.name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyField("name"));
    }
    let email = record.email.trim();
    if !email.is_empty() && !email.contains('@') {
        return Err(ValidationError::InvalidEmail(email.to_string()));
    }
    Ok(Parent {
        name: name.to_string(),
        email: email.to_string(),
        phone: record.phone.trim().to_string(),
        children: record
            .children
            .iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect(),
        ..record.clone()
    })
}

/// Role names are unique ignoring case; `existing` is the current collection.
pub fn role(record: &Role, existing: &[Role]) -> Result<Role, ValidationError> {
    let name = record.name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyField("name"));
    }
    let clash = existing
        .iter()
        .any(|r| r.id != record.id && r.name.trim().eq_ignore_ascii_case(name));
    if clash {
        return Err(ValidationError::DuplicateRoleName(name.to_string()));
    }
    let mut permissions: Vec<String> = record
        .permissions
        .iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();
    permissions.dedup();
    Ok(Role {
        name: name.to_string(),
        description: record.description.trim().to_string(),
        permissions,
        ..record.clone()
    })
}
