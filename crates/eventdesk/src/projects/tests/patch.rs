use super::common::*;
use crate::projects::{ConfigSection, PatchError, Project, ProjectDetailsPatch, ProjectId};
use chrono::NaiveDate;
use serde_json::json;

fn project() -> Project {
    Project::from_seed(ProjectId::from("p1"), seed("Spring Meetup"), now())
}

#[test]
fn empty_patch_is_the_identity_for_every_section() {
    for section in ConfigSection::ordered() {
        let mut patched = project();
        patched
            .apply_patch(section, &json!({}))
            .expect("empty patch applies");
        assert_eq!(patched, project(), "section {section} changed");
    }
}

#[test]
fn patch_merges_keys_and_leaves_siblings_alone() {
    let mut patched = project();
    patched
        .apply_patch(
            ConfigSection::LandingPage,
            &json!({ "isEnabled": true, "heroImage": "https://cdn.example.com/hero.png" }),
        )
        .expect("landing patch applies");

    let original = project();
    assert!(patched.landing_page.is_enabled);
    assert_eq!(
        patched.landing_page.hero_image.as_deref(),
        Some("https://cdn.example.com/hero.png")
    );
    assert_eq!(patched.landing_page.title, original.landing_page.title);
    assert_eq!(patched.landing_page.theme_color, "#3b82f6");
    assert_eq!(patched.registration_page, original.registration_page);
    assert_eq!(patched.seo, original.seo);
}

#[test]
fn null_clears_optional_keys() {
    let mut patched = project();
    patched
        .apply_patch(ConfigSection::Policy, &json!({ "maxParticipants": 50 }))
        .expect("policy patch applies");
    assert_eq!(patched.policy.capacity(), Some(50));

    patched
        .apply_patch(ConfigSection::Policy, &json!({ "maxParticipants": null }))
        .expect("policy patch applies");
    assert_eq!(patched.policy.max_participants, None);
}

#[test]
fn schedule_patches_accept_datetime_local_values() {
    let mut patched = project();
    patched
        .apply_patch(
            ConfigSection::Schedule,
            &json!({
                "applicationStart": "2024-03-01T09:00",
                "applicationEnd": "2024-04-10T18:00",
            }),
        )
        .expect("schedule patch applies");

    assert_eq!(patched.schedule.application_start, Some(at(2024, 3, 1, 9)));
    assert_eq!(patched.schedule.application_end, Some(at(2024, 4, 10, 18)));
}

#[test]
fn invalid_patch_leaves_the_project_unchanged() {
    let mut patched = project();
    let result = patched.apply_patch(
        ConfigSection::Policy,
        &json!({ "maxParticipants": "fifty" }),
    );

    assert!(matches!(
        result,
        Err(PatchError::Invalid {
            section: ConfigSection::Policy,
            ..
        })
    ));
    assert_eq!(patched, project());

    let result = patched.apply_patch(ConfigSection::Terms, &json!(["not", "an", "object"]));
    assert!(matches!(
        result,
        Err(PatchError::NotAnObject {
            section: ConfigSection::Terms
        })
    ));
}

#[test]
fn section_names_parse_from_either_casing() {
    assert_eq!(
        "landingPage".parse::<ConfigSection>().expect("camel"),
        ConfigSection::LandingPage
    );
    assert_eq!(
        "registration_page".parse::<ConfigSection>().expect("snake"),
        ConfigSection::RegistrationPage
    );
    assert!(matches!(
        "billing".parse::<ConfigSection>(),
        Err(PatchError::UnknownSection(name)) if name == "billing"
    ));
}

#[test]
fn details_patch_updates_only_given_fields() {
    let mut patched = project();
    patched.apply_details(ProjectDetailsPatch {
        location: Some("Busan".to_string()),
        date: NaiveDate::from_ymd_opt(2024, 5, 1),
        ..ProjectDetailsPatch::default()
    });

    assert_eq!(patched.location, "Busan");
    assert_eq!(patched.date, NaiveDate::from_ymd_opt(2024, 5, 1).expect("date"));
    assert_eq!(patched.name, "Spring Meetup");
    assert_eq!(patched.manager_id, "m1");
}
