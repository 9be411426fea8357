//! Row Menu - vertical list navigation driven by canonical buttons
//!
//! UP/DOWN move the selection and wrap around at either end. LEFT, RIGHT,
//! A, B, X and Y are reported as actions on the selected item. On an empty
//! list every button is an action on no item.

use crate::types::Button;

/// What a button did to the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuOutcome {
    /// Selection moved to this index.
    Moved(usize),
    /// Action requested on the item at the index (`None` when empty).
    Action(Button, Option<usize>),
    /// Button has no meaning here (L1, R1, SUPER).
    Ignored,
}

/// Selection state over a list of items.
#[derive(Debug, Clone, Default)]
pub struct RowMenu<T> {
    items: Vec<T>,
    selected: usize,
}

impl<T: PartialEq> RowMenu<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items, selected: 0 }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected(&self) -> Option<&T> {
        self.items.get(self.selected)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Replace the items, keeping the selection on the same item if it is
    /// still present, else resetting to the first row.
    pub fn set_items(&mut self, items: Vec<T>) {
        let new_index = self
            .items
            .get(self.selected)
            .and_then(|current| items.iter().position(|item| item == current))
            .unwrap_or(0);
        self.items = items;
        self.selected = new_index;
    }

    /// Select `index` directly (e.g. pointer hover). Out of range is ignored.
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.items.len() {
            self.selected = index;
            true
        } else {
            false
        }
    }

    pub fn handle(&mut self, button: Button) -> MenuOutcome {
        let len = self.items.len();
        if len == 0 {
            return match button {
                Button::L1 | Button::R1 | Button::Super => MenuOutcome::Ignored,
                other => MenuOutcome::Action(other, None),
            };
        }

        match button {
            Button::Up => {
                self.selected = if self.selected == 0 { len - 1 } else { self.selected - 1 };
                MenuOutcome::Moved(self.selected)
            }
            Button::Down => {
                self.selected = if self.selected + 1 >= len { 0 } else { self.selected + 1 };
                MenuOutcome::Moved(self.selected)
            }
            Button::Left | Button::Right | Button::A | Button::B | Button::X | Button::Y => {
                MenuOutcome::Action(button, Some(self.selected))
            }
            Button::L1 | Button::R1 | Button::Super => MenuOutcome::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> RowMenu<&'static str> {
        RowMenu::new(vec!["Portal", "Celeste", "Hades"])
    }

    #[test]
    fn test_down_wraps_to_top() {
        let mut menu = setup();
        assert_eq!(menu.handle(Button::Down), MenuOutcome::Moved(1));
        assert_eq!(menu.handle(Button::Down), MenuOutcome::Moved(2));
        assert_eq!(menu.handle(Button::Down), MenuOutcome::Moved(0));
    }

    #[test]
    fn test_up_wraps_to_bottom() {
        let mut menu = setup();
        assert_eq!(menu.handle(Button::Up), MenuOutcome::Moved(2));
        assert_eq!(menu.selected(), Some(&"Hades"));
    }

    #[test]
    fn test_actions_on_selected_item() {
        let mut menu = setup();
        menu.handle(Button::Down);
        assert_eq!(menu.handle(Button::A), MenuOutcome::Action(Button::A, Some(1)));
        assert_eq!(menu.handle(Button::Left), MenuOutcome::Action(Button::Left, Some(1)));
        assert_eq!(menu.handle(Button::R1), MenuOutcome::Ignored);
    }

    #[test]
    fn test_empty_menu_reports_action_without_item() {
        let mut menu: RowMenu<&str> = RowMenu::new(Vec::new());
        assert_eq!(menu.handle(Button::Up), MenuOutcome::Action(Button::Up, None));
        assert_eq!(menu.handle(Button::B), MenuOutcome::Action(Button::B, None));
        assert!(menu.selected().is_none());
    }

    #[test]
    fn test_set_items_keeps_selected_item() {
        let mut menu = setup();
        menu.handle(Button::Down);
        menu.set_items(vec!["Hades", "Celeste"]);
        assert_eq!(menu.selected_index(), 1);

        menu.set_items(vec!["Portal 2"]);
        assert_eq!(menu.selected_index(), 0);
    }

    #[test]
    fn test_select_out_of_range() {
        let mut menu = setup();
        assert!(!menu.select(5));
        assert!(menu.select(2));
        assert_eq!(menu.selected(), Some(&"Hades"));
    }
}
