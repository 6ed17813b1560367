//! Property tests for selection state transitions.

use chassis_core::state::reduce;
use chassis_core::{
    Action, AddedParts, Catalog, CompatibleParts, ConfigError, ConfigurationManager, Constraints,
    PartType, SecondProcessorRequirement, SelectionState, Server, ServerId,
};
use proptest::prelude::*;

fn server(id: u32, cpus: u32, memory: u32) -> Server {
    Server {
        id: ServerId(id),
        name: format!("Server {id}"),
        manufacturer: "Acme".to_string(),
        form_factor: "1U Rack".to_string(),
        description: String::new(),
        chassis_types: vec![],
        max_cpu_sockets: cpus,
        max_memory_slots: memory,
        max_pci_slots: 2,
        max_power: 1000,
    }
}

fn catalog(cpus: u32, memory: u32, gpus: u32) -> Catalog {
    Catalog {
        servers: vec![server(1, cpus, memory), server(2, cpus + 1, memory + 2)],
        compatible_parts: CompatibleParts::default(),
        constraints: Constraints {
            max_cpu: cpus,
            max_memory_modules: memory,
            max_gpu: gpus,
            memory_per_processor: 4,
            requires_second_processor_for: SecondProcessorRequirement::default(),
            power_supply_options: vec![],
        },
    }
}

fn part_type() -> impl Strategy<Value = PartType> {
    prop_oneof![Just(PartType::Cpu), Just(PartType::Gpu), Just(PartType::Memory)]
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        (1u32..=3).prop_map(|id| Action::SelectServer(ServerId(id))),
        part_type().prop_map(Action::AddPart),
        part_type().prop_map(Action::RemovePart),
    ]
}

proptest! {
    #[test]
    fn cpu_adds_stop_at_socket_count(k in 0u32..8, extra in 1usize..5) {
        let mut m = ConfigurationManager::new(catalog(k, 4, 1));
        m.select_server(ServerId(1)).unwrap();

        for expected in 1..=k {
            prop_assert_eq!(m.add_part(PartType::Cpu), Ok(expected));
        }
        for _ in 0..extra {
            prop_assert_eq!(
                m.add_part(PartType::Cpu),
                Err(ConfigError::LimitReached { part: PartType::Cpu, limit: k })
            );
            prop_assert_eq!(m.added_parts().cpu, k);
        }
    }

    #[test]
    fn add_before_selection_always_fails(parts in prop::collection::vec(part_type(), 1..20)) {
        let mut m = ConfigurationManager::new(catalog(2, 4, 1));
        for part in parts {
            prop_assert_eq!(m.add_part(part), Err(ConfigError::NoServerSelected));
        }
        prop_assert_eq!(m.added_parts(), AddedParts::default());
    }

    #[test]
    fn invariants_hold_after_every_action(actions in prop::collection::vec(action(), 0..60)) {
        let catalog = catalog(2, 4, 1);
        let mut state = SelectionState::default();

        for action in actions {
            let before = state;
            let t = reduce(&state, action, &catalog);
            if t.outcome.is_err() {
                prop_assert_eq!(t.state, before);
            }
            state = t.state;

            if let Action::SelectServer(_) = action {
                if t.outcome.is_ok() {
                    prop_assert_eq!(state.added_parts, AddedParts::default());
                }
            }
            match state.selected_server_id.and_then(|id| catalog.server(id)) {
                Some(server) => {
                    prop_assert!(state.added_parts.cpu <= server.max_cpu_sockets);
                    prop_assert!(state.added_parts.gpu <= catalog.constraints.max_gpu);
                    prop_assert!(state.added_parts.memory <= server.max_memory_slots);
                }
                None => {
                    prop_assert_eq!(state.added_parts, AddedParts::default());
                }
            }
        }
    }

    #[test]
    fn add_then_remove_restores_count(
        prefix in prop::collection::vec(action(), 0..30),
        part in part_type(),
    ) {
        let catalog = catalog(2, 4, 1);
        let mut m = ConfigurationManager::new(catalog);
        m.select_server(ServerId(2)).unwrap();
        for action in prefix {
            let _ = m.apply(action);
        }
        let before = m.added_parts().get(part);
        if m.add_part(part).is_ok() {
            m.remove_part(part).unwrap();
        }
        prop_assert_eq!(m.added_parts().get(part), before);
    }

    #[test]
    fn remove_at_zero_never_changes_state(part in part_type(), select in any::<bool>()) {
        let mut m = ConfigurationManager::new(catalog(2, 4, 1));
        if select {
            m.select_server(ServerId(1)).unwrap();
        }
        let before = *m.state();
        prop_assert_eq!(m.remove_part(part), Err(ConfigError::NothingToRemove(part)));
        prop_assert_eq!(*m.state(), before);
    }
}

#[test]
fn documented_scenario() {
    let mut m = ConfigurationManager::new(catalog(2, 4, 1));
    m.select_server(ServerId(1)).unwrap();

    let steps = [
        (Action::AddPart(PartType::Cpu), true),
        (Action::AddPart(PartType::Cpu), true),
        (Action::AddPart(PartType::Cpu), false),
        (Action::AddPart(PartType::Gpu), true),
        (Action::AddPart(PartType::Gpu), false),
        (Action::RemovePart(PartType::Cpu), true),
        (Action::AddPart(PartType::Cpu), true),
    ];
    for (action, ok) in steps {
        assert_eq!(m.apply(action).is_ok(), ok, "{action:?}");
    }
    assert_eq!(
        m.added_parts(),
        AddedParts {
            cpu: 2,
            gpu: 1,
            memory: 0
        }
    );
}
