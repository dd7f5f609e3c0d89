//! Property tests for the owner tag priority chain.

use infractl::domain::config::InfraConfig;
use infractl::domain::owner_tag::{parse_previous_tag, render_variables};
use infractl::domain::{OwnerTag, OwnerTagInputs, TagSource, resolve_owner_tag};
use proptest::prelude::*;

fn maybe_value() -> impl Strategy<Value = Option<String>> {
    prop::option::of("[a-z][a-z0-9-]{0,11}")
}

fn maybe_branch() -> impl Strategy<Value = Option<String>> {
    prop::option::of(prop_oneof![
        Just("refs/heads/main".to_string()),
        Just("refs/heads/develop".to_string()),
        "refs/heads/[a-z]{1,8}",
    ])
}

prop_compose! {
    fn inputs()(
        explicit in maybe_value(),
        branch_ref in maybe_branch(),
        actor in maybe_value(),
        previous in maybe_value(),
        local_user in maybe_value(),
    ) -> OwnerTagInputs {
        OwnerTagInputs { explicit, branch_ref, actor, previous, local_user }
    }
}

proptest! {
    /// An explicit prefix always wins, whatever else is set.
    #[test]
    fn prop_explicit_prefix_wins(mut inputs in inputs(), prefix in "[a-z]{1,10}") {
        inputs.explicit = Some(prefix.clone());
        let (tag, source) = resolve_owner_tag(&inputs, &InfraConfig::default().branch_table());
        prop_assert_eq!(tag.as_str(), prefix.as_str());
        prop_assert_eq!(source, TagSource::Explicit);
    }

    /// The resolved tag is never empty and the reported source is the
    /// first rule whose input is present.
    #[test]
    fn prop_first_present_rule_fires(inputs in inputs()) {
        let table = InfraConfig::default().branch_table();
        let (tag, source) = resolve_owner_tag(&inputs, &table);
        prop_assert!(!tag.as_str().is_empty());

        let expected = if inputs.explicit.is_some() {
            TagSource::Explicit
        } else if inputs.branch_ref.as_deref() == Some("refs/heads/main") {
            TagSource::ProductionBranch
        } else if inputs.branch_ref.as_deref() == Some("refs/heads/develop") {
            TagSource::StagingBranch
        } else if inputs.actor.is_some() {
            TagSource::CiActor
        } else if inputs.previous.is_some() {
            TagSource::VariablesFile
        } else {
            TagSource::LocalUser
        };
        prop_assert_eq!(source, expected);
    }

    /// Without an override, the production branch maps to the fixed tag
    /// regardless of the actor.
    #[test]
    fn prop_main_branch_is_prod(actor in maybe_value(), previous in maybe_value()) {
        let inputs = OwnerTagInputs {
            explicit: None,
            branch_ref: Some("refs/heads/main".into()),
            actor,
            previous,
            local_user: None,
        };
        let (tag, _) = resolve_owner_tag(&inputs, &InfraConfig::default().branch_table());
        prop_assert_eq!(tag.as_str(), "prod");
    }

    /// Whatever text a tag is built from, it is a valid tag and survives the
    /// variables file unchanged.
    #[test]
    fn prop_any_input_round_trips_through_tfvars(raw in any::<String>()) {
        if let Some(tag) = OwnerTag::new(&raw) {
            let parsed = OwnerTag::parse(tag.as_str());
            prop_assert_eq!(parsed.as_ref(), Ok(&tag));
            let content = render_variables(&tag);
            let previous = parse_previous_tag(&content);
            prop_assert_eq!(previous.as_deref(), Some(tag.as_str()));
        }
    }
}
