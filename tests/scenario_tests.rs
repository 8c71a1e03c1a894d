use form_harness::actions::{ActionOutcome, FieldValue};
use form_harness::browser::driver::{ElementRef, PageDriver};
use form_harness::browser::fake::{FakeElement, FakeEvent, FakePage};
use form_harness::error::HarnessError;
use form_harness::fixture::FixtureData;
use form_harness::locator::{FieldReference, strategy};
use form_harness::scenario::composer::Composer;
use form_harness::scenario::progress::FormProgress;
use form_harness::scenario::step_model::{Condition, FieldEntry, NavAction, ScenarioStep, StepEntry};

use crate::common::{add_control, add_radio, control, fast_config, form_page};

mod common;

fn music_step(answer: &str) -> ScenarioStep {
    ScenarioStep::new("household")
        .field(FieldReference::radio("Music instruments"), FieldValue::Radio(answer.into()))
        .entry(StepEntry::When {
            condition: Condition::Equals {
                field: "Music instruments".into(),
                value: "yes".into(),
            },
            then: vec![StepEntry::Field(FieldEntry::required(
                FieldReference::text("Type of music instrument"),
                FieldValue::Text("Piano".into()),
            ))],
            otherwise: vec![],
        })
}

fn music_page() -> (FakePage, String) {
    let mut page = FakePage::new();
    add_radio(&mut page, &FieldReference::radio("Music instruments"), &["Yes", "No"]);
    let instrument = add_control(&mut page, &FieldReference::text("Type of music instrument"));
    (page, instrument)
}

// =========================================================================
// Branching on recorded answers
// =========================================================================

#[test]
fn branch_taken_when_answer_matches() {
    let (mut page, instrument) = music_page();
    {
        let mut composer = Composer::new(&mut page, fast_config());
        composer.run_step(&music_step("Yes")).unwrap();
        assert!(composer.answers().is("music instruments", "YES"));
        assert_eq!(composer.records().len(), 2);
    }
    assert!(page.fills().contains(&(instrument, "Piano".to_string())));
}

#[test]
fn branch_skipped_when_answer_differs() {
    let (mut page, _) = music_page();
    let mut composer = Composer::new(&mut page, fast_config());
    composer.run_step(&music_step("No")).unwrap();
    assert_eq!(composer.records().len(), 1);
}

fn nationality_page(rendered: &'static str) -> (FakePage, String) {
    let mut page = FakePage::new();
    let control = add_control(&mut page, &FieldReference::select("Nationality"));
    page.on_click(&control, 0, move |dom| {
        dom.set(strategy::DROPDOWN_OPTIONS, vec![FakeElement::with_text(rendered)]);
    });
    let hometown = add_control(&mut page, &FieldReference::text("Hometown"));
    (page, hometown)
}

fn swiss_step(requested: &str) -> ScenarioStep {
    ScenarioStep::new("personal")
        .field(FieldReference::select("Nationality"), FieldValue::Option(requested.into()))
        .entry(StepEntry::When {
            condition: Condition::Equals {
                field: "Nationality".into(),
                value: "Switzerland".into(),
            },
            then: vec![StepEntry::Field(FieldEntry::required(
                FieldReference::text("Hometown"),
                FieldValue::Text("Bern".into()),
            ))],
            otherwise: vec![],
        })
}

#[test]
fn branch_follows_fallback_option_not_request() {
    let (mut page, hometown) = nationality_page("Germany");
    {
        let mut composer = Composer::new(&mut page, fast_config().lenient());
        composer.run_step(&swiss_step("Switzerland")).unwrap();
        assert_eq!(
            composer.records()[0].outcome,
            ActionOutcome::FallbackSelected {
                requested: "Switzerland".into(),
                option: "Germany".into()
            }
        );
        assert_eq!(composer.answers().get("Nationality"), Some("Germany"));
        assert_eq!(composer.records().len(), 1);
    }
    assert!(!page.fills().iter().any(|(s, _)| *s == hometown));
}

#[test]
fn branch_sees_full_option_text_of_partial_request() {
    let (mut page, hometown) = nationality_page("Switzerland");
    {
        let mut composer = Composer::new(&mut page, fast_config());
        composer.run_step(&swiss_step("switz")).unwrap();
        assert_eq!(composer.answers().get("Nationality"), Some("Switzerland"));
    }
    assert!(page.fills().contains(&(hometown, "Bern".to_string())));
}

#[test]
fn repeated_radio_answer_is_not_clicked_again() {
    let (mut page, _) = music_page();
    let mut composer = Composer::new(&mut page, fast_config());
    composer.run_step(&music_step("No")).unwrap();
    composer.run_step(&music_step("No")).unwrap();

    assert_eq!(
        composer.records()[1].outcome,
        ActionOutcome::AlreadySelected { option: "No".into() }
    );
}

// =========================================================================
// Optional and required fields
// =========================================================================

#[test]
fn absent_optional_field_is_skipped_immediately() {
    let mut page = FakePage::new();
    let mut composer = Composer::new(&mut page, fast_config());

    let step = ScenarioStep::new("wishes").optional(
        FieldReference::text("Reason for home office work"),
        FieldValue::Text("Remote".into()),
    );
    composer.run_step(&step).unwrap();

    assert!(matches!(
        composer.records()[0].outcome,
        ActionOutcome::Skipped { .. }
    ));
    assert!(composer.answers().is_empty());
}

#[test]
fn absent_required_field_fails_the_step() {
    let mut page = FakePage::new();
    let mut composer = Composer::new(&mut page, fast_config());

    let step = ScenarioStep::new("household")
        .field(FieldReference::text("IBAN number"), FieldValue::Text("CH93".into()));
    let err = composer.run_step(&step).unwrap_err();
    assert!(matches!(err, HarnessError::FieldNotFound { ref label, .. } if label == "IBAN number"));
}

#[test]
fn placeholders_come_from_fixtures() {
    let fixtures = FixtureData::with_seed(7);
    let mut page = FakePage::new();
    let email = add_control(&mut page, &FieldReference::text("E-mail"));
    {
        let mut composer = Composer::new(&mut page, fast_config()).with_fixtures(&fixtures);
        composer
            .apply_field(&FieldEntry::required(
                FieldReference::text("E-mail"),
                FieldValue::Text("{{email}}".into()),
            ))
            .unwrap();
    }
    assert_eq!(page.fills(), vec![(email, fixtures.email().to_string())]);
}

// =========================================================================
// Step progression
// =========================================================================

#[test]
fn save_and_next_moves_indicator_and_progress() {
    let mut page = form_page(1);
    let mut composer = Composer::new(&mut page, fast_config());

    composer
        .run_step(&ScenarioStep::new("wishes").after(NavAction::SaveAndNext))
        .unwrap();
    assert_eq!(composer.progress(), FormProgress::Step1Filled);

    let wait = composer.wait();
    form_harness::scenario::progress::expect_step(composer.driver(), "2", &wait).unwrap();
}

#[test]
fn disabled_save_continues_without_advancing() {
    let mut page = FakePage::new().with(
        strategy::SAVE_AND_NEXT,
        FakeElement::visible().class("btn-next btn-disabled"),
    );
    {
        let mut composer = Composer::new(&mut page, fast_config());
        composer.perform(&NavAction::SaveAndNext).unwrap();
        assert_eq!(composer.progress(), FormProgress::NotStarted);
    }
    assert_eq!(page.clicks_on(strategy::SAVE_AND_NEXT), 0);
}

#[test]
fn missing_save_fails_at_the_step_check() {
    let mut page = FakePage::new().with(strategy::ACTIVE_STEP, FakeElement::with_text("1"));
    let mut composer = Composer::new(&mut page, fast_config());

    composer
        .run_step(&ScenarioStep::new("wishes").after(NavAction::SaveAndNext))
        .unwrap();
    let wait = composer.wait();
    let err = form_harness::scenario::progress::expect_step(composer.driver(), "2", &wait).unwrap_err();
    assert!(matches!(err, HarnessError::UnexpectedStep { ref actual, .. } if actual == "1"));
}

// =========================================================================
// Household members
// =========================================================================

fn household_page() -> (FakePage, String) {
    let mut page = FakePage::new().with(strategy::CREATE_ADULT, FakeElement::visible());
    let first_name = add_control(&mut page, &FieldReference::text("First name"));
    let save = strategy::exact_text("Save");
    page.insert(&save, FakeElement::visible().class("btn btn-primary"));
    page.on_click(&save, 0, |dom| dom.push(strategy::PERSON_CARD, FakeElement::visible()));
    (page, first_name)
}

fn adult_entries() -> Vec<StepEntry> {
    vec![StepEntry::Field(FieldEntry::required(
        FieldReference::text("First name"),
        FieldValue::Text("Ivo".into()),
    ))]
}

#[test]
fn adds_requested_number_of_adults() {
    let (mut page, first_name) = household_page();
    {
        let mut composer = Composer::new(&mut page, fast_config());
        composer.add_adults(2, &adult_entries(), "Save").unwrap();
    }
    assert_eq!(page.count(strategy::PERSON_CARD).unwrap(), 2);
    assert_eq!(page.clicks_on(strategy::CREATE_ADULT), 2);
    assert_eq!(page.fills().iter().filter(|(s, _)| *s == first_name).count(), 2);
}

#[test]
fn each_member_gets_one_fresh_email() {
    let fixtures = FixtureData::with_seed(11);
    let (mut page, _) = household_page();
    let email = FieldReference::text("E-mail");
    let confirm = FieldReference::text("Confirm e-mail");
    let email_sel = add_control(&mut page, &email);
    let confirm_sel = add_control(&mut page, &confirm);
    let entries: Vec<StepEntry> = [email.clone(), confirm]
        .into_iter()
        .map(|f| {
            StepEntry::Field(FieldEntry::required(f, FieldValue::Text("{{member_email}}".into())))
        })
        .collect();
    {
        let mut composer = Composer::new(&mut page, fast_config()).with_fixtures(&fixtures);
        composer.add_adults(2, &entries, "Save").unwrap();

        // outside a round the run's address is used
        composer
            .apply_field(&FieldEntry::required(email, FieldValue::Text("{{member_email}}".into())))
            .unwrap();
    }

    let fills = page.fills();
    let typed = |sel: &str| -> Vec<String> {
        fills.iter().filter(|(s, _)| s == sel).map(|(_, v)| v.clone()).collect()
    };
    let emails = typed(email_sel.as_str());
    assert_eq!(emails.len(), 3);
    assert_eq!(typed(confirm_sel.as_str()), emails[..2].to_vec());
    assert_ne!(emails[0], emails[1]);
    assert_eq!(emails[2], fixtures.email());
}

#[test]
fn adult_without_new_card_times_out() {
    let mut page = FakePage::new()
        .with(strategy::CREATE_ADULT, FakeElement::visible())
        .with(&strategy::exact_text("Save"), FakeElement::visible());
    let mut composer = Composer::new(&mut page, fast_config());

    let err = composer.add_adults(1, &[], "Save").unwrap_err();
    assert!(matches!(err, HarnessError::Timeout { .. }));
}

fn deletable_page(modal: bool) -> FakePage {
    let trash = strategy::person_card_trash(0);
    let mut page = FakePage::new()
        .with(&strategy::person_card(0), FakeElement::visible())
        .with(&trash, FakeElement::visible());
    if modal {
        page.on_click(&trash, 0, |dom| {
            dom.push(strategy::MODAL_FOOTER, FakeElement::visible());
            dom.push(strategy::MODAL_CONFIRM, FakeElement::with_text("Delete"));
        });
        page.on_click(strategy::MODAL_CONFIRM, 0, |dom| {
            dom.set_visible(strategy::MODAL_FOOTER, false);
            dom.remove(&strategy::person_card(0));
        });
    }
    page
}

#[test]
fn delete_adult_confirms_through_modal() {
    let mut page = deletable_page(true);
    {
        let mut composer = Composer::new(&mut page, fast_config());
        assert!(composer.delete_adult(0).unwrap());
    }
    assert_eq!(page.clicks_on(strategy::MODAL_CONFIRM), 1);
    assert_eq!(page.count(&strategy::person_card(0)).unwrap(), 0);
}

#[test]
fn delete_without_card_is_a_no_op() {
    let mut page = FakePage::new();
    let mut composer = Composer::new(&mut page, fast_config());
    assert!(!composer.delete_adult(3).unwrap());
}

#[test]
fn missing_modal_is_fatal_unless_best_effort() {
    let mut page = deletable_page(false);
    let mut composer = Composer::new(&mut page, fast_config());

    let strict = [StepEntry::DeleteAdult {
        index: 0,
        best_effort: false,
    }];
    let err = composer.run_entries(&strict).unwrap_err();
    assert!(matches!(err, HarnessError::ModalNotAppeared { .. }));

    let lenient = [StepEntry::DeleteAdult {
        index: 0,
        best_effort: true,
    }];
    composer.run_entries(&lenient).unwrap();
}

// =========================================================================
// Bulk clicks
// =========================================================================

const YES: &str = "ul.radio-list li[title='Yes']";

#[test]
fn yes_buttons_clicked_unless_already_selected() {
    let mut page = FakePage::new()
        .with(YES, FakeElement::with_text("Yes").class("radio-list-item selected"))
        .with(YES, FakeElement::with_text("Yes").class("radio-list-item"))
        .with(YES, FakeElement::hidden());
    {
        let mut composer = Composer::new(&mut page, fast_config());
        composer
            .run_entries(&[StepEntry::ClickEach {
                selector: YES.into(),
                skip_class: Some(strategy::SELECTED_CLASS.into()),
            }])
            .unwrap();
        assert_eq!(composer.records().len(), 2);
        assert_eq!(
            composer.records()[0].outcome,
            ActionOutcome::AlreadySelected { option: "Yes".into() }
        );
    }
    assert_eq!(page.clicks_on(YES), 1);
    assert!(page.events().contains(&FakeEvent::Click(ElementRef::new(YES, 1))));
}

#[test]
fn no_yes_buttons_fails_the_step() {
    let mut page = FakePage::new();
    let mut composer = Composer::new(&mut page, fast_config());
    let err = composer
        .run_entries(&[StepEntry::ClickEach {
            selector: YES.into(),
            skip_class: None,
        }])
        .unwrap_err();
    assert!(matches!(err, HarnessError::Timeout { .. }));
}

#[test]
fn selector_override_addresses_unlabelled_controls() {
    let field = FieldReference::text("E-mail #2").selector("input[type='email']").nth(1);
    let mut page = FakePage::new()
        .with("input[type='email']", FakeElement::visible())
        .with("input[type='email']", FakeElement::visible());
    {
        let mut composer = Composer::new(&mut page, fast_config());
        composer
            .apply_field(&FieldEntry::required(field.clone(), FieldValue::Text("a@b.ch".into())))
            .unwrap();
    }
    assert_eq!(control(&field), "input[type='email']");
    assert!(matches!(
        &page.events()[0],
        form_harness::browser::fake::FakeEvent::Fill(el, _) if el.nth == 1
    ));
}
