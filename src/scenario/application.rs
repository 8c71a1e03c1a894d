//! Built-in scenarios for the demo tenant, expressed as [`TestSpec`]s so
//! they run through the same runner and reports as YAML specs.

use std::path::PathBuf;

use chrono::{Datelike, Local, Months, NaiveDate};

use crate::actions::FieldValue;
use crate::error::{HarnessError, Result};
use crate::locator::{FieldReference, WidgetKind, strategy};
use crate::scenario::step_model::{Condition, FieldEntry, NavAction, ScenarioStep, StepEntry};
use crate::spec::spec_model::{AssertionSpec, TestSpec, TestStep};

/// Names accepted by [`build`].
pub const SCENARIOS: &[(&str, &str)] = &[
    ("homepage", "Landing page loads with title, text, images and buttons"),
    ("landing", "Application landing page: logo, contact links, privacy note, start"),
    ("application-form", "English application form, steps 1 to 4 with N adults"),
    ("listing-apply", "German flow from a listing row through the popup to submission"),
];

const LISTING_ROW: &str = "00.01.02 Kanzlei A";

/// "Yes" items of every radio list on a form page.
const YES_BUTTONS: &str = "ul.radio-list li[title='Yes']";

/// Number incrementers filled on the first page, typed as 1, 2, ... up to this many.
const NUMBER_INPUTS: usize = 7;

/// Documents offered after the credit check choice.
const CREDIT_CHECK_DOCUMENTS: &[&str] = &[
    "Excerpt from the debt collection register",
    "Copy of ID or passport",
    "Copy of residence permit",
    "Tax invoice / withholding tax",
    "Additional document",
    "Additional document 2",
    "Additional document 3",
];

const FULL_TIME: &str = "Full-time (90-100%)";

/// Path tokens of a previously started application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeTokens {
    pub first: String,
    pub second: String,
    pub uuid: String,
}

impl ResumeTokens {
    /// Parse `token1/token2/uuid`.
    pub fn parse(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.trim_matches('/').split('/').collect();
        match parts.as_slice() {
            [first, second, uuid] if parts.iter().all(|p| !p.is_empty()) => Ok(Self {
                first: first.to_string(),
                second: second.to_string(),
                uuid: uuid.to_string(),
            }),
            _ => Err(HarnessError::Config(format!(
                "resume tokens must look like 'token1/token2/uuid', got '{}'",
                s
            ))),
        }
    }
}

/// URL of an application already in progress.
pub fn resume_url(base: &str, first: &str, second: &str, uuid: &str) -> String {
    format!(
        "{}/form/application/new/{}/{}/{}",
        base.trim_end_matches('/'),
        first,
        second,
        uuid
    )
}

/// Inputs shared by the built-in scenarios.
#[derive(Debug, Clone)]
pub struct ScenarioParams {
    pub base_url: String,
    pub num_adults: usize,
    /// File for the optional document uploads
    pub document: Option<PathBuf>,
    pub resume: Option<ResumeTokens>,
    /// Reference day for relative calendar dates
    pub today: NaiveDate,
}

impl ScenarioParams {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            num_adults: 1,
            document: None,
            resume: None,
            today: Local::now().date_naive(),
        }
    }

    pub fn with_adults(mut self, n: usize) -> Self {
        self.num_adults = n;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// A day in the month `months_back` before today, reachable by the date picker.
    fn past_date(&self, months_back: u32, day: u32) -> FieldValue {
        let month = self
            .today
            .checked_sub_months(Months::new(months_back))
            .unwrap_or(self.today);
        FieldValue::Date {
            day,
            month: month_name(month.month()),
            year: month.year(),
        }
    }
}

fn month_name(month: u32) -> String {
    chrono::Month::try_from(month as u8)
        .map(|m| m.name().to_string())
        .unwrap_or_else(|_| "January".to_string())
}

/// Build the named scenario.
pub fn build(name: &str, params: &ScenarioParams) -> Result<TestSpec> {
    match name {
        "homepage" => Ok(homepage(params)),
        "landing" => Ok(landing(params)),
        "application-form" => Ok(application_form(params)),
        "listing-apply" => Ok(listing_apply(params)),
        other => Err(HarnessError::Config(format!(
            "unknown scenario '{}' (known: {})",
            other,
            SCENARIOS.iter().map(|(n, _)| *n).collect::<Vec<_>>().join(", ")
        ))),
    }
}

fn text(s: &str) -> FieldValue {
    FieldValue::Text(s.to_string())
}

fn option(s: &str) -> FieldValue {
    FieldValue::Option(s.to_string())
}

fn radio(s: &str) -> FieldValue {
    FieldValue::Radio(s.to_string())
}

fn field(field: FieldReference, value: FieldValue) -> StepEntry {
    StepEntry::Field(FieldEntry::required(field, value))
}

fn optional(field: FieldReference, value: FieldValue) -> StepEntry {
    StepEntry::Field(FieldEntry::optional(field, value))
}

fn checkbox(selector: &str) -> FieldReference {
    FieldReference::new(selector, WidgetKind::Checkbox).selector(selector)
}

fn equals(field: &str, value: &str) -> Condition {
    Condition::Equals {
        field: field.into(),
        value: value.into(),
    }
}

fn when(condition: Condition, then: Vec<StepEntry>) -> StepEntry {
    StepEntry::When {
        condition,
        then,
        otherwise: Vec::new(),
    }
}

fn click_yes_buttons() -> StepEntry {
    StepEntry::ClickEach {
        selector: YES_BUTTONS.into(),
        skip_class: Some(strategy::SELECTED_CLASS.into()),
    }
}

/// The page's generic upload control, replacing any earlier file.
fn document_upload(path: &std::path::Path) -> StepEntry {
    optional(
        FieldReference::new("Document", WidgetKind::FileUpload)
            .selector(".mdt-file-upload input[type='file']"),
        FieldValue::File {
            path: path.to_path_buf(),
        },
    )
}

/// Radio list recognised by one of its options, for lists whose label varies.
fn radio_offering(label: &str, option: &str) -> FieldReference {
    FieldReference::radio(label).selector(format!(
        "xpath=//div[contains(@class, 'mdt-radio-list') and .//li[normalize-space(text())={}]]",
        strategy::xpath_literal(option)
    ))
}

pub fn homepage(params: &ScenarioParams) -> TestSpec {
    TestSpec {
        name: "homepage".into(),
        start_url: params.url("/"),
        steps: vec![
            TestStep::Assert {
                assertions: vec![
                    AssertionSpec::TitleContains {
                        expected: "Demo".into(),
                    },
                    AssertionSpec::TextPresent {
                        expected: "Mostar".into(),
                    },
                    AssertionSpec::ElementCountAtLeast {
                        selector: "img".into(),
                        min: 1,
                    },
                    AssertionSpec::ElementCountAtLeast {
                        selector: "button".into(),
                        min: 1,
                    },
                ],
            },
            TestStep::ClickElement {
                selector: "a[href='#wohnen']".into(),
            },
            TestStep::Assert {
                assertions: vec![AssertionSpec::AnchorReached {
                    anchor: "wohnen".into(),
                }],
            },
        ],
    }
}

pub fn landing(params: &ScenarioParams) -> TestSpec {
    TestSpec {
        name: "landing".into(),
        start_url: params.url("/form/application/new?lang=en"),
        steps: vec![
            TestStep::Assert {
                assertions: vec![
                    AssertionSpec::TitleContains {
                        expected: "melon".into(),
                    },
                    AssertionSpec::ElementVisible {
                        selector: "img.logo".into(),
                        scroll: true,
                    },
                    AssertionSpec::LinkVisible {
                        text: "emonitor".into(),
                    },
                    AssertionSpec::LinkVisible {
                        text: "support@emonitor.ch".into(),
                    },
                    AssertionSpec::ElementVisible {
                        selector: "div.privacy-policy".into(),
                        scroll: true,
                    },
                ],
            },
            TestStep::ClickElement {
                selector: "#start-application-btn".into(),
            },
            TestStep::Assert {
                assertions: vec![AssertionSpec::UrlContains {
                    expected: "application".into(),
                }],
            },
        ],
    }
}

fn start_url(params: &ScenarioParams) -> String {
    match &params.resume {
        Some(t) => resume_url(&params.base_url, &t.first, &t.second, &t.uuid),
        None => params.url("/form/application/new?lang=en"),
    }
}

pub fn application_form(params: &ScenarioParams) -> TestSpec {
    let mut steps = Vec::new();
    if params.resume.is_none() {
        steps.push(TestStep::ClickElement {
            selector: "#start-application-btn".into(),
        });
    }

    steps.push(TestStep::Form(wishes_step(params)));
    steps.push(TestStep::ExpectStep {
        expected: "2".into(),
    });
    steps.push(TestStep::Form(household_step(params)));
    steps.push(TestStep::ExpectStep {
        expected: "3".into(),
    });
    steps.push(TestStep::Form(adults_step(params)));
    steps.push(TestStep::ExpectStep {
        expected: "4".into(),
    });
    steps.push(TestStep::Form(
        ScenarioStep::new("agreements")
            .field(checkbox("input#agreement_truth"), FieldValue::Check)
            .field(checkbox("input#agreement_privacy"), FieldValue::Check)
            .optional(checkbox("input#agreement_penalty"), FieldValue::Check)
            .after(NavAction::Save {
                text: "Save".into(),
            }),
    ));

    TestSpec {
        name: "application-form".into(),
        start_url: start_url(params),
        steps,
    }
}

fn wishes_step(params: &ScenarioParams) -> ScenarioStep {
    let mut step = ScenarioStep::new("property wishes").entry(click_yes_buttons());
    for i in 0..NUMBER_INPUTS {
        step = step.optional(
            FieldReference::new(format!("Number #{}", i), WidgetKind::Number)
                .selector(strategy::NUMBER_INPUTS)
                .nth(i),
            FieldValue::Number(i as i64 + 1),
        );
    }
    if let Some(path) = &params.document {
        step = step.entry(document_upload(path));
    }
    step.optional(
        FieldReference::text("Car ownership justification"),
        text("I own a car for work purposes."),
    )
    .optional(FieldReference::text("Wanted area of additional room (from-to)"), text("15-30 sqm"))
    .optional(FieldReference::text("Wanted area of storage room (from-to)"), text("10-20 sqm"))
    .optional(FieldReference::text("Reason for home office work"), text("Remote work requirement."))
    .after(NavAction::SaveAndNext)
}

fn household_step(params: &ScenarioParams) -> ScenarioStep {
    let mut step = ScenarioStep::new("household")
        .entry(click_yes_buttons())
        .field(FieldReference::select("Household type"), option("couple household"))
        .optional(FieldReference::text("Type of pet / dog breed"), text("Golden Retriever"));
    if let Some(path) = &params.document {
        step = step.entry(document_upload(path));
    }
    step.field(FieldReference::radio("Music instruments"), radio("Yes"))
        .entry(when(
            equals("Music instruments", "Yes"),
            vec![field(FieldReference::text("Type of music instrument"), text("Piano"))],
        ))
        .field(FieldReference::radio("Smoker"), radio("No"))
        .field(FieldReference::select("Reason for moving"), option("Change in space requirements"))
        .field(FieldReference::text("Desired reference date"), text("01-09-2024"))
        .field(
            FieldReference::text("Wanted doorbell/mailbox label"),
            text("{{first_name}} {{last_name}}"),
        )
        .field(
            FieldReference::radio("Security deposit (3 grossly month rent)"),
            radio("Insurance solution"),
        )
        .optional(FieldReference::select("Provider"), option("SwissCaution"))
        .field(FieldReference::radio("Monthly household income > 3 monthly rents"), radio("Yes"))
        .field(FieldReference::text("IBAN number"), text("CH9300762011623852957"))
        .field(FieldReference::text("Bank name and location"), text("Swiss Bank, Zurich"))
        .field(FieldReference::text("Account owner"), text("{{first_name}} {{last_name}}"))
        .field(FieldReference::text("Motivation"), text("Looking for a community-oriented environment."))
        .field(
            FieldReference::new("Participation ideas", WidgetKind::Textarea),
            text("Volunteering in community events"),
        )
        .field(
            FieldReference::new("Remarks", WidgetKind::Textarea),
            text("Looking forward to being part of the community."),
        )
        .field(FieldReference::select("Object found on"), option("Search engine"))
        .field(FieldReference::select("Relation to the cooperative"), option("Current tenant"))
        .field(FieldReference::select("Type of relation"), option("Already living in the neighborhood"))
        .after(NavAction::SaveAndNext)
}

fn adult_entries(params: &ScenarioParams) -> Vec<StepEntry> {
    let phone = || FieldValue::Phone {
        country_code: "49".into(),
        digits: "15234567890".into(),
    };
    let email = FieldReference::new("E-mail", WidgetKind::Text).selector("input[type='email']");

    let mut entries = vec![
        field(FieldReference::select("Salutation"), option("Mr.")),
        field(FieldReference::text("First name"), text("{{first_name}}")),
        field(FieldReference::text("Last name"), text("{{last_name}}")),
        field(
            FieldReference::new("Date of birth", WidgetKind::DatePicker),
            params.past_date(24, 15),
        ),
        field(FieldReference::text("Place of birth"), text("Zurich")),
        field(FieldReference::select("Civil status"), option("single")),
        field(
            FieldReference::select("Nationality"),
            FieldValue::Search("Switzerland".into()),
        ),
        StepEntry::When {
            condition: equals("Nationality", "Switzerland"),
            then: vec![field(FieldReference::text("Hometown"), text("Bern"))],
            otherwise: vec![field(
                FieldReference::select("Residence permit"),
                option("(B) Residence permit"),
            )],
        },
        field(
            FieldReference::new("Living in Switzerland since", WidgetKind::DatePicker),
            params.past_date(6, 1),
        ),
        field(FieldReference::select("Type of tenant"), option("Main tenant")),
        field(FieldReference::new("Phone", WidgetKind::PhoneNumber).nth(0), phone()),
        optional(FieldReference::new("Phone", WidgetKind::PhoneNumber).nth(1), phone()),
        field(email.clone().nth(0), text("{{member_email}}")),
        field(email.nth(1), text("{{member_email}}")),
        field(FieldReference::select("Current rental situation"), option("Own home")),
        field(FieldReference::text("Street and Number"), text("123 Main St")),
        field(FieldReference::text("Post code"), text("8001")),
        optional(FieldReference::text("City"), text("Zurich")),
        field(
            FieldReference::select("Country"),
            FieldValue::Search("Switzerland".into()),
        ),
        field(
            FieldReference::new("Move-in date", WidgetKind::DatePicker),
            params.past_date(9, 10),
        ),
        field(FieldReference::radio("Civil law principal residence"), radio("Yes")),
        field(FieldReference::radio("Relocation in the last 3 years"), radio("Yes")),
        when(
            equals("Relocation in the last 3 years", "Yes"),
            vec![
                field(FieldReference::text("Previous street and number"), text("Old Town 5")),
                field(FieldReference::text("Post code of the previous address"), text("8001")),
                field(FieldReference::text("Previous municipality"), text("Zurich")),
                optional(
                    FieldReference::new("Date of entry", WidgetKind::DatePicker),
                    params.past_date(10, 15),
                ),
            ],
        ),
        field(FieldReference::radio("Already a member of the community"), radio("Yes")),
        when(
            equals("Already a member of the community", "Yes"),
            vec![field(FieldReference::text("Membership number"), text("123456"))],
        ),
        field(FieldReference::radio("Personal liability insurance available"), radio("Yes")),
        when(
            equals("Personal liability insurance available", "Yes"),
            vec![optional(
                FieldReference::text("Specify personal liability insurance"),
                text("Swiss Insurance Co."),
            )],
        ),
        field(FieldReference::radio("Household insurance available"), radio("Yes")),
        when(
            equals("Household insurance available", "Yes"),
            vec![field(
                FieldReference::text("Specify household insurance"),
                text("Premium Home Insurance"),
            )],
        ),
        field(FieldReference::radio("Free insurance check wanted"), radio("Yes")),
        optional(
            FieldReference::select("Highest educational qualification"),
            option("Tertiary level"),
        ),
        optional(FieldReference::select("Employment status"), option(FULL_TIME)),
        when(equals("Employment status", FULL_TIME), employment_entries()),
        optional(FieldReference::select("Gross annual income"), option("CHF 100’000 - CHF 110’000")),
        optional(FieldReference::text("Annual taxable income"), text("85000")),
        optional(FieldReference::text("Taxable assets"), text("120000")),
        optional(
            radio_offering("Credit check", "Excerpt from the debt collection register"),
            radio("Excerpt from the debt collection register"),
        ),
    ];
    if let Some(path) = &params.document {
        entries.extend(CREDIT_CHECK_DOCUMENTS.iter().map(|label| {
            optional(
                FieldReference::new(*label, WidgetKind::FileUpload),
                FieldValue::File { path: path.clone() },
            )
        }));
    }
    entries.push(optional(checkbox("input#agreement_references"), FieldValue::Check));
    entries
}

/// Employer details asked for full-time employees.
fn employment_entries() -> Vec<StepEntry> {
    vec![
        optional(FieldReference::text("Occupation"), text("Software Engineer")),
        optional(radio_offering("Type of employment", "Permanent"), radio("Permanent")),
        optional(FieldReference::text("Starting date at the company"), text("10.10.2024")),
        optional(
            radio_offering("Employment relationship", "Not terminated"),
            radio("Not terminated"),
        ),
        optional(FieldReference::text("Company name"), text("TechCorp Ltd.")),
        optional(FieldReference::text("Street and number"), text("123 Tech Street")),
        // the employer's post code input ignores typing
        optional(
            FieldReference::text("Post code").nth(2),
            FieldValue::Script("8000".into()),
        ),
        optional(FieldReference::text("Place of work"), text("Zurich")),
        optional(FieldReference::text("Contact person for reference check"), text("John Doe")),
        optional(
            FieldReference::new("Phone number of contact person", WidgetKind::PhoneNumber),
            FieldValue::Phone {
                country_code: "41".into(),
                digits: "781234567".into(),
            },
        ),
        optional(
            FieldReference::text("Email address of contact person"),
            text("{{unique_email}}"),
        ),
    ]
}

fn adults_step(params: &ScenarioParams) -> ScenarioStep {
    let mut step = ScenarioStep::new("adults").entry(StepEntry::AddAdults {
        count: params.num_adults,
        entries: adult_entries(params),
        save: "Save".into(),
    });
    if params.num_adults > 1 {
        step = step.entry(StepEntry::DeleteAdult {
            index: params.num_adults - 1,
            best_effort: true,
        });
    }
    step.after(NavAction::SaveAndNext)
}

/// German flow entered from a listing, where controls carry placeholders
/// rather than labels and are addressed by position.
pub fn listing_apply(params: &ScenarioParams) -> TestSpec {
    let choose = |n: usize| {
        FieldReference::select(format!("Bitte auswählen #{}", n))
            .selector("xpath=//input[@placeholder='Bitte auswählen']")
            .nth(n)
    };
    let answer = |n: usize| {
        FieldReference::radio(format!("Auswahl #{}", n))
            .selector("xpath=//div[contains(@class, 'mdt-radio-list')]")
            .nth(n)
    };
    let specify = |n: usize| {
        FieldReference::text(format!("Bitte präzisieren #{}", n))
            .selector("xpath=//input[@placeholder='Bitte präzisieren']")
            .nth(n)
    };
    let email = FieldReference::text("E-Mail").selector("input[type='email']");

    let household = ScenarioStep::new("haushalt")
        .field(choose(0), option("Einpersonen-Haushalt"))
        .field(answer(0), radio("Nein"))
        .field(answer(1), radio("Nein"))
        .field(choose(1), option("Umbau/Sanierung"))
        .optional(answer(2), radio("Mietkautionskonto"))
        .field(choose(4), option("Instagram"))
        .after(NavAction::Save {
            text: "Speichern und weiter".into(),
        });

    let adult = vec![
        field(choose(0), option("Herr")),
        field(specify(0), text("{{first_name}}")),
        field(specify(1), text("{{last_name}}")),
        field(choose(1), option("verheiratet")),
        field(
            FieldReference::select("Nationalität")
                .selector("xpath=//input[@placeholder='Suche...']")
                .nth(0),
            FieldValue::Search("Schweiz".into()),
        ),
        field(
            FieldReference::new("Telefon", WidgetKind::PhoneNumber)
                .selector("xpath=//div[contains(@class, 'mdt-phone-number-input')]")
                .nth(0),
            FieldValue::Phone {
                country_code: "41".into(),
                digits: "791234567".into(),
            },
        ),
        field(
            FieldReference::new("Hiermit bestätige ich, dass", WidgetKind::Checkbox),
            FieldValue::Check,
        ),
    ];

    let adults = ScenarioStep::new("erwachsene")
        .entry(StepEntry::AddAdults {
            count: params.num_adults,
            entries: adult,
            save: "Speichern".into(),
        })
        .after(NavAction::Save {
            text: "Speichern und weiter".into(),
        });

    let confirm = ScenarioStep::new("bestätigung")
        .optional(
            FieldReference::new("Zieht der Mietinteressent", WidgetKind::Checkbox),
            FieldValue::Check,
        )
        .field(
            FieldReference::new("Ich bestätige, alle Fragen", WidgetKind::Checkbox),
            FieldValue::Check,
        )
        .field(
            FieldReference::new("Ich habe die Datenschutzerklä", WidgetKind::Checkbox),
            FieldValue::Check,
        )
        .after(NavAction::Save {
            text: "Speichern".into(),
        });

    TestSpec {
        name: "listing-apply".into(),
        start_url: params.url("/"),
        steps: vec![
            TestStep::ClickElement {
                selector: format!(
                    "xpath=//tr[contains(normalize-space(.), '{}')]//span",
                    LISTING_ROW
                ),
            },
            TestStep::Form(
                ScenarioStep::new("bewerben")
                    .before(NavAction::FollowPopup {
                        text: "Bewerben".into(),
                    })
                    .before(NavAction::ClickText {
                        text: "Start".into(),
                    })
                    .before(NavAction::Save {
                        text: "Speichern und weiter".into(),
                    }),
            ),
            TestStep::Form(household),
            TestStep::Form(adults),
            TestStep::Form(confirm),
        ],
    }
}
