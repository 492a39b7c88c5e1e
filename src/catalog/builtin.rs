//! The built-in onboarding catalog served when no catalog file is configured.

use super::model::{FieldDescriptor, FieldType, Step, StepCatalog};

/// Two steps: identity, then location and email preferences.
pub fn default_catalog() -> StepCatalog {
    let identity = Step::new(vec![
        FieldDescriptor::new("firstName", FieldType::Text)
            .with_label("First Name")
            .required(),
        FieldDescriptor::new("lastName", FieldType::Text).with_label("Last Name"),
        FieldDescriptor::new("bio", FieldType::MultilineText).with_label("Bio"),
    ]);

    let preferences = Step::new(vec![
        FieldDescriptor::new("country", FieldType::Text)
            .with_label("Country")
            .required(),
        FieldDescriptor::new("receiveNotifications", FieldType::YesNo)
            .with_label(
                "I would like to receive email notifications for new messages when I'm logged out",
            )
            .required(),
        FieldDescriptor::new("receiveUpdates", FieldType::YesNo)
            .with_label("I would like to receive updates about the product via email")
            .required(),
    ]);

    // Hand-written above; names are unique per step.
    StepCatalog::new(vec![identity, preferences]).unwrap_or_default()
}
