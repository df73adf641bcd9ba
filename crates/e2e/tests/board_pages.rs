//! Page objects driven against a fake bridge that models the stage board

mod common;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::{json, Value};

use ats_e2e::pages::{AddCandidatePage, PositionDetailsPage, PositionsPage};
use common::{fake_bridge, methods, shape};

const COLUMN_WIDTH: f64 = 300.0;
const COLUMN_GAP: f64 = 100.0;

/// Stage columns as (header, candidate names)
struct Board {
    columns: Vec<(&'static str, Vec<&'static str>)>,
}

impl Board {
    fn new(columns: Vec<(&'static str, Vec<&'static str>)>) -> Self {
        Self { columns }
    }

    fn column_box(index: usize) -> Value {
        json!({
            "x": index as f64 * (COLUMN_WIDTH + COLUMN_GAP),
            "y": 200.0,
            "width": COLUMN_WIDTH,
            "height": 600.0
        })
    }

    fn answer(&self, method: &str, params: &Value) -> Result<Value, String> {
        let (shape, at) = shape(params);
        match (method, shape.as_str()) {
            ("count", "col") => Ok(json!(self.columns.len())),
            ("count", "col # body first card") => Ok(json!(self.columns[at[0]].1.len())),
            ("text_content", "col #") => {
                let (header, names) = &self.columns[at[0]];
                Ok(json!(format!("{} {}", header, names.join(" "))))
            }
            ("text_content", "col # header first") => Ok(json!(self.columns[at[0]].0)),
            ("text_content", "col # body first card # title first") => {
                Ok(json!(self.columns[at[0]].1[at[1]]))
            }
            ("bounding_box", "col #") => Ok(Self::column_box(at[0])),
            ("bounding_box", "col # body first card #") => Ok(json!({
                "x": at[0] as f64 * (COLUMN_WIDTH + COLUMN_GAP) + 10.0,
                "y": 260.0 + at[1] as f64 * 90.0,
                "width": 280.0,
                "height": 80.0
            })),
            ("hover" | "mouse_down" | "mouse_move" | "mouse_up", _) => Ok(Value::Null),
            _ => Err(format!("unexpected {} on [{}]", method, shape)),
        }
    }
}

fn board_bridge(
    columns: Vec<(&'static str, Vec<&'static str>)>,
) -> (ats_e2e::playwright::PlaywrightHandle, common::Calls) {
    let board = Board::new(columns);
    fake_bridge(move |method, params| board.answer(method, params))
}

fn pipeline() -> Vec<(&'static str, Vec<&'static str>)> {
    vec![
        ("Aplicado", vec![]),
        ("Entrevista técnica", vec!["María González", "Carlos Rodríguez"]),
        ("Oferta", vec!["Ana Martínez"]),
    ]
}

#[tokio::test]
async fn test_first_non_empty_column_is_chosen() {
    let (page, _) = board_bridge(pipeline());
    let details = PositionDetailsPage::new(&page);

    let (column, index) = details.column_with_candidates().await.unwrap().unwrap();
    assert_eq!(index, 1);
    assert_eq!(details.candidate_count(&column).await.unwrap(), 2);
    assert_eq!(
        details.column_header(&column).await.unwrap().as_deref(),
        Some("Entrevista técnica")
    );
}

#[tokio::test]
async fn test_empty_board_has_no_candidate_column() {
    let (page, _) = board_bridge(vec![("Aplicado", vec![]), ("Oferta", vec![])]);
    let details = PositionDetailsPage::new(&page);

    assert!(details.column_with_candidates().await.unwrap().is_none());
}

#[tokio::test]
async fn test_random_candidate_comes_from_the_column() {
    let (page, _) = board_bridge(pipeline());
    let details = PositionDetailsPage::new(&page);
    let mut rng = StdRng::seed_from_u64(7);

    let (column, _) = details.column_with_candidates().await.unwrap().unwrap();
    for _ in 0..5 {
        let candidate = details
            .random_candidate_from_column(&column, &mut rng)
            .await
            .unwrap();
        let name = details.candidate_name(&candidate).await.unwrap().unwrap();
        assert!(["María González", "Carlos Rodríguez"].contains(&name.as_str()));
    }
}

#[tokio::test]
async fn test_random_candidate_from_empty_column_fails() {
    let (page, _) = board_bridge(pipeline());
    let details = PositionDetailsPage::new(&page);
    let mut rng = StdRng::seed_from_u64(7);

    let columns = details.columns().await.unwrap();
    let result = details.random_candidate_from_column(&columns[0], &mut rng).await;
    assert!(matches!(result, Err(ats_e2e::E2eError::ElementNotFound(_))));
}

#[tokio::test]
async fn test_drag_from_last_column_wraps_to_first() {
    let (page, calls) = board_bridge(pipeline());
    let details = PositionDetailsPage::new(&page);
    let mut rng = StdRng::seed_from_u64(1);

    let columns = details.columns().await.unwrap();
    let candidate = details
        .random_candidate_from_column(&columns[2], &mut rng)
        .await
        .unwrap();

    let next = details
        .move_candidate_to_next_column(&candidate, 2, columns.len())
        .await
        .unwrap();
    assert_eq!(next, Some(0));

    let sent = methods(&calls);
    let drag: Vec<&str> = sent
        .iter()
        .map(String::as_str)
        .skip_while(|m| *m != "hover")
        .collect();
    assert_eq!(drag, vec!["hover", "mouse_down", "mouse_move", "mouse_up"]);

    let calls = calls.lock().unwrap();
    let (_, mouse_move) = calls.iter().find(|(m, _)| m == "mouse_move").unwrap();
    // Centre of column 0
    assert_eq!(mouse_move["x"], json!(150.0));
    assert_eq!(mouse_move["y"], json!(500.0));
    assert_eq!(mouse_move["steps"], json!(10));
}

#[tokio::test]
async fn test_drag_without_layout_box_does_not_touch_mouse() {
    let (page, calls) = fake_bridge(|method, _| match method {
        "bounding_box" => Ok(Value::Null),
        _ => Err(format!("unexpected {}", method)),
    });
    let details = PositionDetailsPage::new(&page);

    let candidate = page.locator(".card").first();
    let target = page.locator("div.col-md-3").nth(1);
    assert!(!details.drag_to(&candidate, &target).await.unwrap());
    assert_eq!(methods(&calls), vec!["bounding_box", "bounding_box"]);
}

#[tokio::test]
async fn test_blank_card_title_has_no_name() {
    let (page, _) = board_bridge(vec![("Aplicado", vec!["  \n  "]), ("Oferta", vec![" Ana Martínez "])]);
    let details = PositionDetailsPage::new(&page);

    let columns = details.columns().await.unwrap();
    let blank = columns[0].locator(".card-body").first().locator(".card:has(.card-title)").nth(0);
    let padded = columns[1].locator(".card-body").first().locator(".card:has(.card-title)").nth(0);

    assert_eq!(details.candidate_name(&blank).await.unwrap(), None);
    assert_eq!(
        details.candidate_name(&padded).await.unwrap().as_deref(),
        Some("Ana Martínez")
    );
}

#[tokio::test]
async fn test_blank_name_is_never_found_in_a_column() {
    let (page, calls) = board_bridge(pipeline());
    let details = PositionDetailsPage::new(&page);

    assert!(!details.verify_candidate_in_column("   ", 1).await.unwrap());
    assert!(!details.verify_candidate_in_column("", 1).await.unwrap());
    assert!(methods(&calls).is_empty());
}

#[tokio::test]
async fn test_verify_candidate_in_column() {
    let (page, _) = board_bridge(pipeline());
    let details = PositionDetailsPage::new(&page);

    assert!(details.verify_candidate_in_column("Ana Martínez", 2).await.unwrap());
    assert!(!details.verify_candidate_in_column("Ana Martínez", 1).await.unwrap());
    assert!(!details.verify_candidate_in_column("Ana Martínez", 9).await.unwrap());
}

#[tokio::test]
async fn test_missing_success_alert_reads_as_false() {
    let (page, calls) = fake_bridge(|method, _| match method {
        "wait_for_selector" => Err("Timeout 10000ms exceeded".to_string()),
        _ => Ok(Value::Null),
    });
    let form = AddCandidatePage::new(&page);

    assert!(!form.wait_for_success_message().await.unwrap());

    let calls = calls.lock().unwrap();
    assert_eq!(calls[0].1["timeout"], json!(10_000));
    assert_eq!(calls[0].1["state"], json!("visible"));
}

#[tokio::test]
async fn test_success_alert_shown() {
    let (page, _) = fake_bridge(|_, _| Ok(Value::Null));
    let form = AddCandidatePage::new(&page);
    assert!(form.wait_for_success_message().await.unwrap());
}

#[tokio::test]
async fn test_error_alert_text() {
    let (page, _) = fake_bridge(|method, _| match method {
        "is_visible" => Ok(json!(true)),
        "text_content" => Ok(json!("El correo ya existe")),
        _ => Ok(Value::Null),
    });
    let form = AddCandidatePage::new(&page);

    assert_eq!(
        form.error_message().await.unwrap().as_deref(),
        Some("El correo ya existe")
    );
}

#[tokio::test]
async fn test_go_back_falls_back_to_history() {
    let (page, calls) = fake_bridge(|method, _| match method {
        "is_visible" => Ok(json!(false)),
        _ => Ok(Value::Null),
    });
    let form = AddCandidatePage::new(&page);

    form.go_back().await.unwrap();
    assert_eq!(methods(&calls), vec!["is_visible", "go_back"]);
}

#[tokio::test]
async fn test_find_position_card_by_title() {
    let titles = ["Senior Backend Engineer", "Product Designer"];
    let (page, _) = fake_bridge(move |method, params| {
        let (shape, at) = shape(params);
        match (method, shape.as_str()) {
            ("count", "position") => Ok(json!(titles.len())),
            ("text_content", "position # title first") => Ok(json!(titles[at[0]])),
            _ => Err(format!("unexpected {} on [{}]", method, shape)),
        }
    });
    let positions = PositionsPage::new(&page);

    let card = positions
        .find_card_by_title(Some("Product Designer"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        positions.position_title(&card).await.unwrap().as_deref(),
        Some("Product Designer")
    );
    assert!(positions
        .find_card_by_title(Some("Data Scientist"))
        .await
        .unwrap()
        .is_none());
}
