use design_board::command::{Command, LayerDirection};
use design_board::element::factory::ShapeKind;
use design_board::element::{ElementId, Fill, ImageSource};
use design_board::state::EditorModel;
use egui::{Color32, pos2};

fn open() -> EditorModel {
    EditorModel::open(ImageSource::url("product.png"))
}

fn add_rectangle(model: &mut EditorModel) -> ElementId {
    Command::AddShape {
        shape: ShapeKind::Rectangle,
        position: pos2(300.0, 300.0),
        color: Color32::RED,
        fill: Fill::Transparent,
    }
    .execute(model);
    model.selected_id().cloned().unwrap()
}

#[test]
fn test_base_product_survives_every_delete_path() {
    let mut model = open();
    let base = ElementId::base_product();

    assert!(!Command::Delete { element_id: base.clone() }.execute(&mut model));
    model.select(Some(&base));
    let selected = model.selected_id().cloned().unwrap();
    assert!(!model.delete_element(&selected));

    let copy = model.duplicate_element(&base).unwrap();
    assert!(model.delete_element(&copy));
    while model.undo() {}

    assert!(model.base_product().is_some());
    assert_eq!(model.len(), 1);
}

#[test]
fn test_n_commits_undo_back_to_seed() {
    let mut model = open();
    let rect = add_rectangle(&mut model);
    Command::Rotate {
        element_id: rect.clone(),
        degrees: 15.0,
    }
    .execute(&mut model);
    Command::Flip {
        element_id: rect.clone(),
    }
    .execute(&mut model);
    Command::MoveLayer {
        element_id: rect.clone(),
        direction: LayerDirection::Up,
    }
    .execute(&mut model);
    Command::Duplicate { element_id: rect }.execute(&mut model);

    let n = 5;
    assert_eq!(model.history_index(), n);
    for _ in 0..n {
        assert!(Command::Undo.execute(&mut model));
    }
    assert_eq!(model.len(), 1);
    assert!(model.base_product().is_some());
    assert!(!Command::Undo.execute(&mut model));
    assert_eq!(model.history_index(), 0);
}

#[test]
fn test_commit_after_undo_discards_future() {
    let mut model = open();
    let first = add_rectangle(&mut model);
    let second = add_rectangle(&mut model);
    assert_eq!(model.history_len(), 3);

    model.undo();
    assert!(model.find_element_by_id(&second).is_none());

    Command::Rotate {
        element_id: first,
        degrees: 15.0,
    }
    .execute(&mut model);

    assert_eq!(model.history_len(), 3);
    assert_eq!(model.history_index(), 2);
    // Undoing all the way never brings the discarded rectangle back
    while model.undo() {
        assert!(model.find_element_by_id(&second).is_none());
    }
}

#[test]
fn test_opacity_preview_is_one_entry() {
    let mut model = open();
    let rect = add_rectangle(&mut model);
    let before = model.history_index();

    for opacity in [90, 70, 50] {
        Command::SetOpacity {
            element_id: rect.clone(),
            opacity,
        }
        .execute(&mut model);
    }
    assert_eq!(model.history_index(), before);
    Command::Commit.execute(&mut model);

    assert_eq!(model.history_index(), before + 1);
    assert_eq!(model.find_element_by_id(&rect).unwrap().opacity, 50);
    model.undo();
    assert_eq!(model.find_element_by_id(&rect).unwrap().opacity, 100);
}

#[test]
fn test_paint_order_is_ascending_z() {
    let mut model = open();
    let ids: Vec<ElementId> = (0..3).map(|_| add_rectangle(&mut model)).collect();
    for (id, z) in ids.iter().zip([3, 1, 2]) {
        model.update_element(id, design_board::element::ElementPatch::default().z_index(z));
    }
    // Base product sits at 0
    let order: Vec<i32> = model.paint_order().iter().map(|e| e.z_index).collect();
    assert_eq!(order, vec![0, 1, 2, 3]);
    assert_eq!(model.paint_order()[1].id, ids[1]);
    assert_eq!(model.paint_order()[3].id, ids[0]);
}

#[test]
fn test_unknown_ids_are_ignored() {
    let mut model = open();
    let ghost = ElementId::from("ghost");
    assert!(!Command::Resize {
        element_id: ghost.clone(),
        delta: 20.0
    }
    .execute(&mut model));
    assert!(!Command::Duplicate { element_id: ghost }.execute(&mut model));
    assert_eq!(model.history_index(), 0);
}
