mod common;

use assert_matches::assert_matches;
use rust_decimal::Decimal;

use common::{item, price};
use parlour_booking::{
    backend::ApiError,
    dto::assets::CreateAssetRequest,
    error::{AppError, Violation},
    models::DeviceType,
    services::{
        asset_composer::{AssetComposer, AssetField},
        draft_catalog::DraftCatalog,
        search_service::SearchOutcome,
    },
};

fn valid_pc(composer: &mut AssetComposer, name: &str) {
    composer.set_field(AssetField::Device(DeviceType::PC));
    composer.set_field(AssetField::Name(name.to_string()));
    composer.set_field(AssetField::RegularPrice(price(120)));
    composer.set_field(AssetField::Specs("RTX 4070, 32GB".into()));
}

#[test]
fn validate_reports_every_violation() {
    let mut composer = AssetComposer::new();
    composer.set_field(AssetField::RegularPrice(Some(Decimal::ZERO)));
    composer.set_field(AssetField::HappyHourPrice(price(-5)));

    assert_eq!(
        composer.validate(&DraftCatalog::default()),
        vec![
            Violation::Required("name"),
            Violation::RegularPriceNotPositive,
            Violation::HappyHourPriceNegative,
            Violation::SpecsRequired(DeviceType::PC),
        ]
    );
}

#[test]
fn specs_are_only_required_for_pc() {
    let mut composer = AssetComposer::new();
    composer.set_field(AssetField::Name("VR Bay".into()));
    composer.set_field(AssetField::RegularPrice(price(200)));
    for device in DeviceType::ALL {
        composer.set_field(AssetField::Device(device));
        let violations = composer.validate(&DraftCatalog::default());
        assert_eq!(violations.is_empty(), !device.requires_specs(), "{device}");
    }
}

#[test]
fn leaving_pc_clears_specs() {
    let mut composer = AssetComposer::new();
    composer.set_field(AssetField::Specs("i9".into()));
    composer.set_field(AssetField::Device(DeviceType::PS5));
    assert!(composer.working().specs.is_empty());

    composer.set_field(AssetField::Specs("slim".into()));
    composer.set_field(AssetField::Device(DeviceType::Xbox));
    assert_eq!(composer.working().specs, "slim");
}

#[test]
fn duplicate_item_is_rejected_without_change() {
    let mut composer = AssetComposer::new();
    composer.add_item(item("42", "Doom")).unwrap();

    for _ in 0..3 {
        assert_matches!(
            composer.add_item(item("42", "Doom Eternal")),
            Err(AppError::DuplicateItem(ref id)) if id == "42"
        );
    }
    assert_eq!(composer.working().items, vec![item("42", "Doom")]);
}

#[test]
fn adding_an_item_clears_the_search() {
    let mut composer = AssetComposer::new();
    composer.set_search_term("do");
    composer.apply_search("do", Ok(SearchOutcome::Results(vec![item("42", "Doom")])));
    assert_eq!(composer.search_state().results.len(), 1);

    composer.add_item(item("42", "Doom")).unwrap();
    assert!(composer.search_state().term.is_empty());
    assert!(composer.search_state().results.is_empty());

    assert!(composer.remove_item("42"));
    assert!(!composer.remove_item("42"));
}

#[test]
fn search_results_for_an_old_term_are_dropped() {
    let mut composer = AssetComposer::new();
    composer.set_search_term("doom");
    composer.apply_search("do", Ok(SearchOutcome::Results(vec![item("1", "Dota")])));
    assert!(composer.search_state().results.is_empty());

    let failure = composer.apply_search(
        "doom",
        Err(AppError::SearchFailed {
            term: "doom".into(),
            cause: ApiError::Transport("timeout".into()),
        }),
    );
    assert_matches!(failure, Some(AppError::SearchFailed { .. }));
    assert!(composer.search_state().results.is_empty());
    assert!(composer.search_state().notice.is_some());
}

#[test]
fn commit_accepts_exactly_what_validate_accepts() {
    let mut catalog = DraftCatalog::default();
    let mut composer = AssetComposer::new();

    valid_pc(&mut composer, "PC 1");
    composer.add_item(item("1", "Valorant")).unwrap();
    assert!(composer.validate(&catalog).is_empty());
    let id = composer.commit_to_draft(&mut catalog).unwrap();

    let asset = catalog.get(id).unwrap();
    assert_eq!(asset.name, "PC 1");
    assert_eq!(asset.items.len(), 1);
    assert_eq!(asset.specs.as_deref(), Some("RTX 4070, 32GB"));
    assert_eq!(composer.working().name, "", "working asset is reset");

    valid_pc(&mut composer, " pc 1 ");
    let expected = composer.validate(&catalog);
    assert_eq!(expected, vec![Violation::DuplicateName("pc 1".into())]);
    let err = composer.commit_to_draft(&mut catalog).unwrap_err();
    assert_eq!(err.violations(), expected.as_slice());
    assert_eq!(catalog.len(), 1);
}

#[test]
fn creation_request_falls_back_to_regular_price_for_happy_hour() {
    let mut catalog = DraftCatalog::default();
    let mut composer = AssetComposer::new();
    valid_pc(&mut composer, "PC 1");
    let plain = composer.commit_to_draft(&mut catalog).unwrap();
    valid_pc(&mut composer, "PC 2");
    composer.set_field(AssetField::HappyHourPrice(price(90)));
    let discounted = composer.commit_to_draft(&mut catalog).unwrap();

    let plain = catalog.get(plain).unwrap();
    assert_eq!(plain.pricing.happy_hour, None);
    let request = CreateAssetRequest::from(plain);
    assert_eq!(request.pricing.happy_hour, Some(Decimal::from(120)));

    let request = CreateAssetRequest::from(catalog.get(discounted).unwrap());
    assert_eq!(request.pricing.happy_hour, Some(Decimal::from(90)));
}

#[test]
fn removal_needs_confirmation() {
    let mut catalog = DraftCatalog::default();
    let mut composer = AssetComposer::new();
    valid_pc(&mut composer, "PC 1");
    let first = composer.commit_to_draft(&mut catalog).unwrap();
    valid_pc(&mut composer, "PC 2");
    composer.commit_to_draft(&mut catalog).unwrap();

    assert!(catalog.confirm_removal().is_none());

    catalog.request_removal(first).unwrap();
    assert_eq!(catalog.pending_removal().unwrap().name, "PC 1");
    catalog.cancel_removal();
    assert!(catalog.pending_removal().is_none());
    assert_eq!(catalog.len(), 2);

    catalog.request_removal(first).unwrap();
    let removed = catalog.confirm_removal().unwrap();
    assert_eq!(removed.local_id, first);
    assert_eq!(catalog.assets()[0].name, "PC 2");

    assert_matches!(catalog.request_removal(first), Err(AppError::NotFound));
}
