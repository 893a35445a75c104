use crate::{
    error::{DispatchError, Result},
    models::context::BatchRequest,
};

pub fn validate_batch_request(request: &BatchRequest) -> Result<()> {
    if request.contact_ids.is_empty() {
        return Err(DispatchError::Validation(
            "Contact id list cannot be empty".to_string(),
        ));
    }

    if request.template_key.trim().is_empty() {
        return Err(DispatchError::Validation(
            "Template key cannot be blank".to_string(),
        ));
    }

    if request.destination_url.trim().is_empty() {
        return Err(DispatchError::Validation(
            "Destination URL cannot be blank".to_string(),
        ));
    }

    let blank = |key: &Option<String>| key.as_deref().is_some_and(|k| k.trim().is_empty());

    if blank(&request.endpoint_key) {
        return Err(DispatchError::Validation(
            "Endpoint key cannot be blank when provided".to_string(),
        ));
    }

    if blank(&request.policy_key) {
        return Err(DispatchError::Validation(
            "Policy key cannot be blank when provided".to_string(),
        ));
    }

    Ok(())
}
