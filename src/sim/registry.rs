//! Actor registry
//!
//! Owns every live actor for a run. Ids come from a monotonic counter and are
//! never handed out twice in the same run, so a stale id can only miss.
//! Actors are kept sorted by id for deterministic iteration.

use super::actors::{Actor, ActorId, DespawnReason};

#[derive(Debug, Clone)]
pub struct ActorRegistry {
    actors: Vec<Actor>,
    next_id: u32,
}

impl Default for ActorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ActorRegistry {
    pub fn new() -> Self {
        Self {
            actors: Vec::new(),
            next_id: 1,
        }
    }

    /// Take ownership of `actor` and give it a fresh id
    pub fn spawn(&mut self, mut actor: Actor) -> ActorId {
        let id = ActorId(self.next_id);
        self.next_id += 1;
        actor.id = id;
        actor.despawn = None;
        // Ids only grow, so pushing keeps the vec sorted
        self.actors.push(actor);
        id
    }

    fn index_of(&self, id: ActorId) -> Option<usize> {
        self.actors.binary_search_by_key(&id, |a| a.id).ok()
    }

    /// Live actor with `id`
    pub fn get(&self, id: ActorId) -> Option<&Actor> {
        self.index_of(id)
            .map(|i| &self.actors[i])
            .filter(|a| a.is_alive())
    }

    pub fn get_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        match self.index_of(id) {
            Some(i) if self.actors[i].is_alive() => Some(&mut self.actors[i]),
            _ => None,
        }
    }

    pub fn for_each_alive(&self, mut f: impl FnMut(&Actor)) {
        for actor in self.actors.iter().filter(|a| a.is_alive()) {
            f(actor);
        }
    }

    pub fn for_each_alive_mut(&mut self, mut f: impl FnMut(&mut Actor)) {
        for actor in self.actors.iter_mut().filter(|a| a.is_alive()) {
            f(actor);
        }
    }

    pub fn iter_alive(&self) -> impl DoubleEndedIterator<Item = &Actor> {
        self.actors.iter().filter(|a| a.is_alive())
    }

    pub fn iter_alive_mut(&mut self) -> impl DoubleEndedIterator<Item = &mut Actor> {
        self.actors.iter_mut().filter(|a| a.is_alive())
    }

    /// Remove `id` immediately, alive or not
    pub fn remove(&mut self, id: ActorId) -> Option<Actor> {
        self.index_of(id).map(|i| self.actors.remove(i))
    }

    /// Mark everything scrolled off the left of the rail.
    ///
    /// Bosses hold their ground and are never culled.
    pub fn cull_offrail(&mut self, left_limit: f32) -> Vec<ActorId> {
        let mut culled = Vec::new();
        for actor in self.iter_alive_mut() {
            if !actor.is_boss() && actor.bounds().max.x < left_limit {
                actor.mark(DespawnReason::OffRail);
                culled.push(actor.id);
            }
        }
        culled
    }

    /// Drop every marked actor, returning them in id order
    pub fn sweep(&mut self) -> Vec<Actor> {
        let (dead, alive): (Vec<Actor>, Vec<Actor>) =
            self.actors.drain(..).partition(|a| !a.is_alive());
        self.actors = alive;
        dead
    }

    pub fn alive_count(&self) -> usize {
        self.iter_alive().count()
    }

    pub fn count_where(&self, pred: impl Fn(&Actor) -> bool) -> usize {
        self.iter_alive().filter(|a| pred(a)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.alive_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::sim::enemies::grunt;

    #[test]
    fn test_spawn_assigns_unique_ids() {
        let mut registry = ActorRegistry::new();
        let a = registry.spawn(grunt(Vec2::new(900.0, 620.0)));
        let b = registry.spawn(Actor::hostage(Vec2::new(960.0, 620.0)));
        assert_ne!(a, b);
        assert_eq!(registry.get(a).unwrap().label(), "grunt");
        assert_eq!(registry.get(b).unwrap().label(), "hostage");
    }

    #[test]
    fn test_ids_not_reused_after_remove() {
        let mut registry = ActorRegistry::new();
        let a = registry.spawn(grunt(Vec2::ZERO));
        assert!(registry.remove(a).is_some());
        let b = registry.spawn(grunt(Vec2::ZERO));
        assert_ne!(a, b);
        assert!(registry.get(a).is_none());
    }

    #[test]
    fn test_marked_actors_hidden_then_swept() {
        let mut registry = ActorRegistry::new();
        let a = registry.spawn(grunt(Vec2::ZERO));
        let b = registry.spawn(grunt(Vec2::new(100.0, 0.0)));
        registry.get_mut(a).unwrap().mark(DespawnReason::Killed);
        assert!(registry.get(a).is_none());
        assert_eq!(registry.alive_count(), 1);

        let dead = registry.sweep();
        assert_eq!(dead.len(), 1);
        assert_eq!(dead[0].id, a);
        assert!(registry.get(b).is_some());
    }

    #[test]
    fn test_cull_offrail_spares_boss() {
        let mut registry = ActorRegistry::new();
        let gone = registry.spawn(grunt(Vec2::new(-500.0, 620.0)));
        let kept = registry.spawn(grunt(Vec2::new(300.0, 620.0)));
        let boss = registry.spawn(crate::sim::boss::boss_actor(Vec2::new(-500.0, 620.0), 600.0));
        let culled = registry.cull_offrail(-200.0);
        assert_eq!(culled, vec![gone]);
        assert!(registry.get(kept).is_some());
        assert!(registry.get(boss).is_some());
    }

    #[test]
    fn test_for_each_alive_skips_marked() {
        let mut registry = ActorRegistry::new();
        let a = registry.spawn(grunt(Vec2::ZERO));
        registry.spawn(grunt(Vec2::ZERO));
        registry.get_mut(a).unwrap().mark(DespawnReason::OffRail);
        let mut seen = 0;
        registry.for_each_alive(|_| seen += 1);
        assert_eq!(seen, 1);
    }
}
