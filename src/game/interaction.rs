//! Interaction Resolution
//!
//! Runs when a combatant's move is blocked by an interactive entity.
//! The effect depends only on the target's kind:
//!
//! | Target       | Effect                               |
//! |--------------|--------------------------------------|
//! | Combatant    | target loses 1 health                |
//! | SpeedPickup  | actor gains the pickup's speed level |
//! | HealthPickup | actor gains the pickup's health      |
//! | Hazard       | actor loses the hazard's health      |
//!
//! Pickups and hazards are consumed. Every branch posts a scoreboard
//! message, then expired entities are settled by the round controller.

use tracing::debug;

use crate::game::automaton;
use crate::game::entity::{EntityId, EntityKind};
use crate::game::round;
use crate::game::state::GameState;

/// Resolve `actor` running into `target`.
///
/// Does nothing unless the actor is a combatant and the target is
/// interactive. Both must be live.
pub fn resolve(state: &mut GameState, actor: EntityId, target: EntityId) {
    let (Some(actor_entity), Some(target_entity)) = (state.registry.get(actor), state.registry.get(target)) else {
        return;
    };
    if !actor_entity.is_combatant() || !target_entity.kind.is_interactive() {
        return;
    }

    let actor_title = actor_entity.label.clone();
    let target_title = target_entity.label.clone();
    let target_kind = target_entity.kind;
    let magnitude = match target_kind {
        EntityKind::SpeedPickup => target_entity.speed_level,
        _ => target_entity.health,
    };

    debug!(actor = %actor, target = %target, kind = ?target_kind, "Resolving interaction");

    let message = match target_kind {
        EntityKind::HumanCombatant | EntityKind::AiCombatant => {
            let mut flee = false;
            let killed = match state.registry.get_mut(target) {
                Some(victim) => {
                    victim.health -= 1;
                    if victim.health <= 0 {
                        victim.expired = true;
                        true
                    } else {
                        flee = victim.kind == EntityKind::AiCombatant;
                        false
                    }
                }
                None => false,
            };
            if flee {
                automaton::force_flee(state, target);
            }
            if killed {
                format!("{target_title} killed by {actor_title}!")
            } else {
                format!("{target_title} attacked by {actor_title}!")
            }
        }

        EntityKind::SpeedPickup => {
            let min_speed = state.config.min_speed_level;
            let bonus = match state.registry.get_mut(actor) {
                Some(entity) => {
                    entity.speed_level += magnitude;
                    entity.speed_level - min_speed
                }
                None => magnitude,
            };
            state.remove_entity(target);
            format!("{actor_title} (+{bonus}) fast mode!")
        }

        EntityKind::HealthPickup => {
            if let Some(entity) = state.registry.get_mut(actor) {
                entity.health += magnitude;
            }
            state.remove_entity(target);
            format!("{actor_title} (+{magnitude}) health!")
        }

        EntityKind::Hazard => {
            let killed = match state.registry.get_mut(actor) {
                Some(entity) => {
                    entity.health -= magnitude;
                    if entity.health <= 0 {
                        entity.expired = true;
                    }
                    entity.expired
                }
                None => false,
            };
            state.remove_entity(target);
            if killed {
                format!("{actor_title} killed by a hazard!")
            } else {
                format!("{actor_title} (-{magnitude}) hazard damage!")
            }
        }

        EntityKind::Obstacle => return,
    };

    state.announce(message);

    if round::settle_expired(state) {
        round::evaluate(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::config::GameConfig;
    use crate::game::entity::{Entity, Size};
    use crate::game::movement::{attempt_move, Direction, MoveOutcome};
    use crate::game::entity::Position;

    fn empty_state() -> GameState {
        let mut config = GameConfig::default();
        config.arena.width = 100;
        config.arena.height = 100;
        config.population.automata = 0;
        GameState::new(config, 11)
    }

    fn add(state: &mut GameState, entity: Entity) -> EntityId {
        let id = entity.id;
        assert!(state.insert_entity(entity));
        id
    }

    fn fighter(state: &mut GameState, kind: EntityKind, label: &str, left: i32, top: i32) -> EntityId {
        let id = state.registry.allocate_id();
        add(
            state,
            Entity::new(id, kind, label, Size::square(10))
                .with_health(10)
                .with_speed_level(4)
                .with_snap_override(false)
                .at(left, top),
        )
    }

    fn messages(state: &mut GameState) -> Vec<String> {
        state
            .take_events()
            .iter()
            .filter_map(|e| e.message().map(str::to_string))
            .collect()
    }

    #[test]
    fn test_hazard_scenario() {
        let mut state = empty_state();
        let a = fighter(&mut state, EntityKind::HumanCombatant, "player 1", 0, 0);
        let h_id = state.registry.allocate_id();
        let h = add(
            &mut state,
            Entity::new(h_id, EntityKind::Hazard, "hazard 1", Size::square(10)).with_health(3).at(5, 5),
        );
        // Keep a second combatant so the round does not end.
        fighter(&mut state, EntityKind::AiCombatant, "zombie 1", 80, 80);
        state.take_events();

        assert_eq!(attempt_move(&mut state, a, Direction::Right, false), Ok(MoveOutcome::Blocked(h)));

        let actor = state.registry.get(a).unwrap();
        assert_eq!(actor.health, 7);
        assert_eq!(actor.position, Position::new(0, 0));
        assert!(!state.registry.contains(h));
        assert_eq!(messages(&mut state), vec!["player 1 (-3) hazard damage!".to_string()]);
    }

    fn lethal_hazard_run(level: u32) -> (GameState, EntityId, EntityId) {
        let mut state = empty_state();
        state.config.population.obstacles = 0;
        state.config.population.speed_pickups = 0;
        state.config.population.health_pickups = 0;
        state.config.population.hazards = 0;

        let a = fighter(&mut state, EntityKind::HumanCombatant, "player 1", 0, 0);
        {
            let actor = state.registry.get_mut(a).unwrap();
            actor.health = 2;
            actor.speed_level = 7;
            actor.level = level;
        }
        let h_id = state.registry.allocate_id();
        let h = add(
            &mut state,
            Entity::new(h_id, EntityKind::Hazard, "hazard 1", Size::square(10)).with_health(3).at(5, 5),
        );
        fighter(&mut state, EntityKind::AiCombatant, "zombie 1", 80, 80);
        state.take_events();

        assert_eq!(attempt_move(&mut state, a, Direction::Right, false), Ok(MoveOutcome::Blocked(h)));
        assert!(!state.registry.contains(h));
        (state, a, h)
    }

    #[test]
    fn test_lethal_hazard_removes_level_one_actor() {
        let (mut state, a, _) = lethal_hazard_run(1);

        assert!(!state.registry.contains(a));
        assert_eq!(
            messages(&mut state),
            vec!["player 1 killed by a hazard!".to_string(), "zombie 1 has won!".to_string()]
        );
    }

    #[test]
    fn test_lethal_hazard_demotes_level_two_actor() {
        let (mut state, a, _) = lethal_hazard_run(2);

        let actor = state.registry.get(a).unwrap();
        assert_eq!(actor.level, 1);
        assert_eq!(actor.health, state.config.max_health);
        assert_eq!(actor.speed_level, state.config.min_speed_level);
        assert!(!actor.expired);
        assert_eq!(state.round, 0);
        assert_eq!(
            messages(&mut state),
            vec![
                "player 1 killed by a hazard!".to_string(),
                "player 1 resurrected at level 1!".to_string(),
            ]
        );
    }

    #[test]
    fn test_speed_pickup_scenario() {
        let mut state = empty_state();
        let a = fighter(&mut state, EntityKind::HumanCombatant, "player 1", 0, 0);
        let p_id = state.registry.allocate_id();
        let p = add(
            &mut state,
            Entity::new(p_id, EntityKind::SpeedPickup, "speed 1", Size::square(10))
                .with_speed_level(2)
                .at(5, 5),
        );
        fighter(&mut state, EntityKind::AiCombatant, "zombie 1", 80, 80);
        state.take_events();

        assert_eq!(attempt_move(&mut state, a, Direction::Right, false), Ok(MoveOutcome::Blocked(p)));

        let actor = state.registry.get(a).unwrap();
        assert_eq!(actor.speed_level, 6);
        assert_eq!(actor.position, Position::new(0, 0));
        assert!(!state.registry.contains(p));
        assert_eq!(messages(&mut state), vec!["player 1 (+2) fast mode!".to_string()]);
    }

    #[test]
    fn test_health_pickup_adds_health() {
        let mut state = empty_state();
        let a = fighter(&mut state, EntityKind::HumanCombatant, "player 1", 0, 0);
        let p_id = state.registry.allocate_id();
        let p = add(
            &mut state,
            Entity::new(p_id, EntityKind::HealthPickup, "health 1", Size::square(10)).with_health(1).at(10, 0),
        );
        fighter(&mut state, EntityKind::AiCombatant, "zombie 1", 80, 80);

        resolve(&mut state, a, p);
        assert_eq!(state.registry.get(a).unwrap().health, 11);
        assert!(!state.registry.contains(p));
    }

    #[test]
    fn test_attack_makes_automaton_flee() {
        let mut state = empty_state();
        let a = fighter(&mut state, EntityKind::HumanCombatant, "player 1", 0, 0);
        let z = fighter(&mut state, EntityKind::AiCombatant, "zombie 1", 10, 0);
        state.take_events();

        resolve(&mut state, a, z);

        assert_eq!(state.registry.get(z).unwrap().health, 9);
        let schedule = state.registry.schedule(z).copied().unwrap();
        assert!(schedule.fast);
        assert_eq!(messages(&mut state), vec!["zombie 1 attacked by player 1!".to_string()]);
    }

    #[test]
    fn test_obstacle_never_interacts() {
        let mut state = empty_state();
        let a = fighter(&mut state, EntityKind::HumanCombatant, "player 1", 0, 0);
        let o_id = state.registry.allocate_id();
        let o = add(&mut state, Entity::new(o_id, EntityKind::Obstacle, "obstacle 1", Size::square(20)).at(10, 0));
        state.take_events();

        resolve(&mut state, a, o);
        assert!(state.registry.contains(o));
        assert!(state.take_events().is_empty());
    }

    #[test]
    fn test_pickup_cannot_be_actor() {
        let mut state = empty_state();
        let p_id = state.registry.allocate_id();
        let p = add(&mut state, Entity::new(p_id, EntityKind::HealthPickup, "health 1", Size::square(10)));
        let a = fighter(&mut state, EntityKind::HumanCombatant, "player 1", 20, 20);
        state.take_events();

        resolve(&mut state, p, a);
        assert_eq!(state.registry.get(a).unwrap().health, 10);
        assert!(state.take_events().is_empty());
    }

    #[test]
    fn test_kill_last_opponent_wins_round() {
        let mut state = empty_state();
        state.config.population.obstacles = 1;
        state.config.population.speed_pickups = 0;
        state.config.population.health_pickups = 0;
        state.config.population.hazards = 0;
        state.config.population.automata = 0;

        let a = fighter(&mut state, EntityKind::HumanCombatant, "player 1", 0, 0);
        let z = fighter(&mut state, EntityKind::AiCombatant, "zombie 1", 10, 0);
        state.registry.get_mut(z).unwrap().health = 1;
        state.take_events();

        resolve(&mut state, a, z);

        assert!(!state.registry.contains(z));
        assert_eq!(state.registry.get(a).unwrap().level, 2);
        assert_eq!(state.round, 1);
        let msgs = messages(&mut state);
        assert_eq!(msgs[0], "zombie 1 killed by player 1!");
        assert!(msgs.contains(&"player 1 has won!".to_string()));
    }
}
