use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::AppError;

use super::models::{DISTANCE_BUCKETS, NewDesiredLocation, NewSubmission, SubmissionForm};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
});

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

fn present(v: &Option<String>) -> Option<String> {
    v.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// 校验公开表单并转换为可入库的提交。
///
/// 校验全部在访问存储之前完成：缺失字段按表单顺序一次性列出；
/// 之后依次检查邮箱格式、里程分档与每个期望地点。
pub fn validate_submission(form: SubmissionForm) -> Result<NewSubmission, AppError> {
    let required = [
        ("vehicleType", present(&form.vehicle_type)),
        ("brandModel", present(&form.brand_model)),
        ("usageType", present(&form.usage_type)),
        ("averageKmsPerDay", present(&form.average_kms_per_day)),
        ("primaryChargingLocation", present(&form.primary_charging_location)),
        ("chargingAddress", present(&form.charging_address)),
        ("chargerType", present(&form.charger_type)),
        ("fullName", present(&form.full_name)),
        ("phone", present(&form.phone)),
        ("email", present(&form.email)),
    ];

    let missing: Vec<String> = required
        .iter()
        .filter(|(_, v)| v.is_none())
        .map(|(name, _)| (*name).to_string())
        .collect();
    if !missing.is_empty() {
        return Err(AppError::MissingFields(missing));
    }

    let [
        vehicle_type,
        brand_model,
        usage_type,
        average_kms_per_day,
        primary_charging_location,
        charging_address,
        charger_type,
        full_name,
        phone,
        email,
    ] = required.map(|(_, v)| v.unwrap_or_default());

    if !is_valid_email(&email) {
        return Err(AppError::Validation("Invalid email format".into()));
    }

    if !DISTANCE_BUCKETS.contains(&average_kms_per_day.as_str()) {
        return Err(AppError::Validation(format!(
            "averageKmsPerDay must be one of: {}",
            DISTANCE_BUCKETS.join(", ")
        )));
    }

    let mut desired_locations = Vec::with_capacity(form.desired_locations.len());
    for (idx, loc) in form.desired_locations.into_iter().enumerate() {
        let (Some(identifier), Some(address)) = (present(&loc.identifier), present(&loc.address))
        else {
            return Err(AppError::Validation(format!(
                "desiredLocations[{idx}] requires identifier and address"
            )));
        };
        desired_locations.push(NewDesiredLocation {
            identifier,
            address,
            latitude: loc.lat,
            longitude: loc.lng,
        });
    }

    Ok(NewSubmission {
        vehicle_type,
        brand_model,
        usage_type,
        average_kms_per_day,
        preference_connector: present(&form.preference_connector),
        usual_charging_schedule: present(&form.usual_charging_schedule),
        primary_charging_location,
        charging_address,
        charging_latitude: form.current_charging_location.lat,
        charging_longitude: form.current_charging_location.lng,
        charger_type,
        cost_per_km_charged: present(&form.cost_per_km_charged),
        full_name,
        phone,
        email,
        desired_locations,
    })
}

#[cfg(test)]
mod tests {
    use super::{is_valid_email, validate_submission};
    use crate::error::AppError;
    use crate::features::submissions::models::{DesiredLocationInput, SubmissionForm};

    fn complete_form() -> SubmissionForm {
        SubmissionForm {
            vehicle_type: Some("SUV".into()),
            brand_model: Some("Tesla Model Y".into()),
            usage_type: Some("Personal".into()),
            average_kms_per_day: Some("Menos de 10Km".into()),
            primary_charging_location: Some("Casa".into()),
            charging_address: Some("Av. Reforma 1".into()),
            charger_type: Some("Nivel 2".into()),
            full_name: Some("Ana Pérez".into()),
            phone: Some("5550001111".into()),
            email: Some("ana@example.com".into()),
            desired_locations: vec![DesiredLocationInput {
                identifier: Some("work".into()),
                address: Some("Insurgentes 100".into()),
                lat: Some(19.4),
                lng: Some(-99.1),
            }],
            ..SubmissionForm::default()
        }
    }

    #[test]
    fn complete_form_is_accepted() {
        let s = validate_submission(complete_form()).expect("valid");
        assert_eq!(s.vehicle_type, "SUV");
        assert_eq!(s.desired_locations.len(), 1);
        assert_eq!(s.desired_locations[0].latitude, Some(19.4));
        assert!(s.cost_per_km_charged.is_none());
    }

    #[test]
    fn missing_fields_are_listed_in_form_order() {
        let form = SubmissionForm {
            email: Some("  ".into()),
            brand_model: None,
            phone: None,
            ..complete_form()
        };
        match validate_submission(form) {
            Err(AppError::MissingFields(fields)) => {
                assert_eq!(fields, vec!["brandModel", "phone", "email"]);
            }
            other => panic!("expected missing fields, got {other:?}"),
        }
    }

    #[test]
    fn malformed_email_is_rejected() {
        let form = SubmissionForm {
            email: Some("not-an-email".into()),
            ..complete_form()
        };
        assert!(matches!(
            validate_submission(form),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn unknown_distance_bucket_is_rejected() {
        let form = SubmissionForm {
            average_kms_per_day: Some("37".into()),
            ..complete_form()
        };
        assert!(matches!(
            validate_submission(form),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn desired_location_without_identifier_is_rejected() {
        let mut form = complete_form();
        form.desired_locations.push(DesiredLocationInput {
            identifier: Some("".into()),
            address: Some("Somewhere".into()),
            ..DesiredLocationInput::default()
        });
        match validate_submission(form) {
            Err(AppError::Validation(msg)) => assert!(msg.contains("desiredLocations[1]")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn email_pattern_matches_basic_addresses() {
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("a b@c.d"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("@b.c"));
    }
}
