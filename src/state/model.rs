use log::{debug, info};

use super::history::History;
use crate::element::factory::{self, ElementDraft};
use crate::element::{DesignElement, DUPLICATE_OFFSET, ElementId, ElementPatch, ImageSource};
use crate::renderer::paint_order;

/// Single source of truth for the open board: the element collection, the
/// selected element and the undo log.
///
/// Every mutator tolerates unknown ids by doing nothing, and none of them
/// can remove the base product element.
#[derive(Debug, Clone)]
pub struct EditorModel {
    elements: Vec<DesignElement>,
    selected: Option<ElementId>,
    history: History,
}

impl EditorModel {
    /// Opens a board seeded with the product image. The seed state is
    /// history entry 0.
    pub fn open(product_image: ImageSource) -> Self {
        let elements = vec![factory::base_product(product_image)];
        info!("Design board opened");
        Self {
            history: History::new(elements.clone()),
            elements,
            selected: None,
        }
    }

    pub fn elements(&self) -> &[DesignElement] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn find_element_by_id(&self, id: &ElementId) -> Option<&DesignElement> {
        self.elements.iter().find(|e| &e.id == id)
    }

    pub fn base_product(&self) -> Option<&DesignElement> {
        self.find_element_by_id(&ElementId::base_product())
    }

    /// Elements in the order they are painted.
    pub fn paint_order(&self) -> Vec<&DesignElement> {
        paint_order(&self.elements)
    }

    pub fn selected_id(&self) -> Option<&ElementId> {
        self.selected.as_ref()
    }

    pub fn selected_element(&self) -> Option<&DesignElement> {
        self.selected.as_ref().and_then(|id| self.find_element_by_id(id))
    }

    /// Selects `id` if it exists; `None` clears the selection.
    pub fn select(&mut self, id: Option<&ElementId>) {
        self.selected = id
            .filter(|id| self.find_element_by_id(id).is_some())
            .cloned();
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Highest z-index on the board, never below 0.
    pub fn max_z_index(&self) -> i32 {
        self.elements.iter().map(|e| e.z_index).fold(0, i32::max)
    }

    /// Inserts a draft with a fresh id and z-index max+1 and selects it.
    ///
    /// Does not commit: the caller commits once the creating gesture is
    /// complete, so a multi-field construction is one history entry.
    pub fn add_element(&mut self, draft: ElementDraft) -> ElementId {
        let id = ElementId::generate();
        let element = draft.build(id.clone(), self.max_z_index() + 1);
        debug!("Adding {} element {}", element.element_type().as_str(), id);
        self.elements.push(element);
        self.selected = Some(id.clone());
        id
    }

    /// Shallow-merges `patch` into the element. Returns false for unknown
    /// ids. Never commits; drags call this on every move and commit once.
    pub fn update_element(&mut self, id: &ElementId, patch: ElementPatch) -> bool {
        match self.elements.iter_mut().find(|e| &e.id == id) {
            Some(element) => {
                patch.apply(element);
                true
            }
            None => false,
        }
    }

    /// Runs `mutate` on the element in place. Returns false for unknown ids.
    /// Like [`Self::update_element`] this never commits.
    pub fn modify_element(
        &mut self,
        id: &ElementId,
        mutate: impl FnOnce(&mut DesignElement),
    ) -> bool {
        match self.elements.iter_mut().find(|e| &e.id == id) {
            Some(element) => {
                mutate(element);
                true
            }
            None => false,
        }
    }

    /// Removes and commits. The base product and unknown ids are no-ops.
    pub fn delete_element(&mut self, id: &ElementId) -> bool {
        if id.is_base_product() {
            debug!("Ignoring delete of the base product");
            return false;
        }
        let Some(index) = self.elements.iter().position(|e| &e.id == id) else {
            return false;
        };
        self.elements.remove(index);
        if self.selected.as_ref() == Some(id) {
            self.selected = None;
        }
        self.commit();
        info!("Deleted element {}", id);
        true
    }

    /// Clones the element with a new id, offset by (+20, +20) and placed on
    /// top. Commits and selects the clone.
    pub fn duplicate_element(&mut self, id: &ElementId) -> Option<ElementId> {
        let mut clone = self.find_element_by_id(id)?.clone();
        let new_id = ElementId::generate();
        clone.id = new_id.clone();
        clone.position += DUPLICATE_OFFSET;
        clone.z_index = self.max_z_index() + 1;

        self.elements.push(clone);
        self.selected = Some(new_id.clone());
        self.commit();
        info!("Duplicated element {} as {}", id, new_id);
        Some(new_id)
    }

    /// Appends the current collection to the undo log.
    pub fn commit(&mut self) {
        self.history.commit(self.elements.clone());
        debug!("Committed history entry {}", self.history.index());
    }

    /// Restores the previous snapshot. No-op at the first entry.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo() else {
            return false;
        };
        self.elements = snapshot.to_vec();
        if let Some(selected) = &self.selected {
            if self.elements.iter().all(|e| &e.id != selected) {
                self.selected = None;
            }
        }
        info!("Undo to history entry {}", self.history.index());
        true
    }

    pub fn history_index(&self) -> usize {
        self.history.index()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }
}
