//! Property tests for region toggling

use licitaciones_cli::models::Region;
use licitaciones_cli::wizard::{UserEvent, Wizard};
use proptest::prelude::*;
use std::collections::BTreeSet;

const NAMES: &[&str] = &["madrid", "galicia", "murcia", "cataluña", "Valencia"];

proptest! {
    #[test]
    fn region_is_selected_iff_toggled_an_odd_number_of_times(
        toggles in prop::collection::vec(0..NAMES.len(), 0..40)
    ) {
        let mut wizard = Wizard::default();
        for &index in &toggles {
            wizard.handle(UserEvent::ToggleRegion(Region::from(NAMES[index]))).unwrap();
        }

        let expected: BTreeSet<Region> = NAMES
            .iter()
            .enumerate()
            .filter(|(index, _)| toggles.iter().filter(|t| *t == index).count() % 2 == 1)
            .map(|(_, name)| Region::from(*name))
            .collect();
        prop_assert_eq!(wizard.state().selected_regions(), &expected);
    }

    #[test]
    fn toggling_never_leaves_results_behind(
        toggles in prop::collection::vec(0..NAMES.len(), 1..20)
    ) {
        let mut wizard = Wizard::default();
        for &index in &toggles {
            wizard.handle(UserEvent::ToggleRegion(Region::from(NAMES[index]))).unwrap();
            prop_assert!(wizard.state().active_results().is_none());
            prop_assert_eq!(wizard.state().loading().count(), 0);
        }
    }
}
