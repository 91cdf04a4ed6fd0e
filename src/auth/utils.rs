use crate::{
    auth::claims::{Claims, UserRole},
    errors::{AppError, AppResult},
};

pub fn require_instructor(claims: &Claims) -> AppResult<()> {
    if claims.role != UserRole::Instructor && claims.role != UserRole::Admin {
        return Err(AppError::Forbidden(
            "Only instructors can perform this action".to_string(),
        ));
    }
    Ok(())
}

pub fn require_owner_or_instructor(claims: &Claims, resource_owner: &str) -> AppResult<()> {
    if claims.sub == resource_owner {
        return Ok(());
    }
    require_instructor(claims)
        .map_err(|_| AppError::Forbidden("You can only access your own attempts".to_string()))
}
