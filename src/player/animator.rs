//! Idle/walk clip selection and cross-fading for the character model.
use std::time::Duration;

use bevy::{gltf::Gltf, prelude::*};

use super::components::{Player, PlayerState};

pub const CHARACTER_MODEL_PATH: &str = "models/character.glb";
pub const CROSS_FADE: Duration = Duration::from_millis(300);

/// The two clips the character switches between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipKind {
    Idle,
    Walk,
}

impl ClipKind {
    pub fn for_motion(moving: bool) -> Self {
        if moving {
            Self::Walk
        } else {
            Self::Idle
        }
    }

    /// Clip names tried in order.
    pub const fn names(self) -> &'static [&'static str] {
        match self {
            Self::Idle => &["Idle", "idle"],
            Self::Walk => &["Walk", "Walking", "walk"],
        }
    }
}

/// Remembers which clip is playing so repeated input is a no-op.
#[derive(Component, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CharacterAnimator {
    current: Option<ClipKind>,
}

impl CharacterAnimator {
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn current(&self) -> Option<ClipKind> {
        self.current
    }

    /// Clip to fade to, or `None` when `moving` already matches what is playing.
    pub fn transition(&mut self, moving: bool) -> Option<ClipKind> {
        let target = ClipKind::for_motion(moving);
        if self.current == Some(target) {
            return None;
        }
        self.current = Some(target);
        Some(target)
    }
}

/// First name in `kind.names()` that `lookup` resolves.
pub fn find_clip<T>(kind: ClipKind, mut lookup: impl FnMut(&str) -> Option<T>) -> Option<T> {
    kind.names().iter().find_map(|name| lookup(*name))
}

/// Graph nodes for the character's clips, built once the glTF is loaded.
#[derive(Resource, Debug)]
pub struct CharacterAnimations {
    gltf: Handle<Gltf>,
    graph: Option<Handle<AnimationGraph>>,
    idle: Option<AnimationNodeIndex>,
    walk: Option<AnimationNodeIndex>,
}

impl CharacterAnimations {
    pub fn new(gltf: Handle<Gltf>) -> Self {
        Self {
            gltf,
            graph: None,
            idle: None,
            walk: None,
        }
    }

    fn node(&self, kind: ClipKind) -> Option<AnimationNodeIndex> {
        match kind {
            ClipKind::Idle => self.idle,
            ClipKind::Walk => self.walk,
        }
    }
}

pub fn load_character_animations(mut commands: Commands, asset_server: Res<AssetServer>) {
    commands.insert_resource(CharacterAnimations::new(
        asset_server.load(CHARACTER_MODEL_PATH),
    ));
}

pub fn release_character_animations(mut commands: Commands) {
    commands.remove_resource::<CharacterAnimations>();
}

/// Builds the animation graph from the glTF's named clips.
pub fn build_animation_graph(
    mut animations: ResMut<CharacterAnimations>,
    gltfs: Res<Assets<Gltf>>,
    mut graphs: ResMut<Assets<AnimationGraph>>,
) {
    if animations.graph.is_some() {
        return;
    }
    let Some(gltf) = gltfs.get(&animations.gltf) else {
        return;
    };

    let idle = find_clip(ClipKind::Idle, |name| gltf.named_animations.get(name).cloned());
    let walk = find_clip(ClipKind::Walk, |name| gltf.named_animations.get(name).cloned());
    if idle.is_none() || walk.is_none() {
        warn!(
            "{} is missing an idle or walk clip (found: {:?})",
            CHARACTER_MODEL_PATH,
            gltf.named_animations.keys().collect::<Vec<_>>()
        );
    }

    let mut graph = AnimationGraph::new();
    let root = graph.root;
    animations.idle = idle.map(|clip| graph.add_clip(clip, 1.0, root));
    animations.walk = walk.map(|clip| graph.add_clip(clip, 1.0, root));
    animations.graph = Some(graphs.add(graph));
}

/// Hooks the graph up to the character's `AnimationPlayer` once the scene spawns it.
pub fn attach_animation_graph(
    mut commands: Commands,
    animations: Res<CharacterAnimations>,
    new_players: Query<Entity, (With<AnimationPlayer>, Without<AnimationGraphHandle>)>,
    parents: Query<&ChildOf>,
    roots: Query<(), With<Player>>,
) {
    let Some(graph) = animations.graph.clone() else {
        return;
    };
    for entity in new_players.iter() {
        if !parents
            .iter_ancestors(entity)
            .any(|ancestor| roots.contains(ancestor))
        {
            continue;
        }
        commands.entity(entity).insert((
            AnimationGraphHandle(graph.clone()),
            AnimationTransitions::new(),
            CharacterAnimator::default(),
        ));
    }
}

/// Cross-fades to walk or idle whenever the controller's moving flag flips.
pub fn drive_character_animation(
    animations: Res<CharacterAnimations>,
    players: Query<&PlayerState, With<Player>>,
    mut animated: Query<(
        &mut AnimationPlayer,
        &mut AnimationTransitions,
        &mut CharacterAnimator,
    )>,
) {
    let Ok(state) = players.single() else {
        return;
    };
    for (mut player, mut transitions, mut animator) in animated.iter_mut() {
        let Some(kind) = animator.transition(state.is_moving) else {
            continue;
        };
        match animations.node(kind) {
            Some(node) => {
                transitions.play(&mut player, node, CROSS_FADE).repeat();
                debug!("Switching animation -> {:?}", kind);
            }
            None => debug!("No {:?} clip; keeping the current pose", kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn repeated_input_is_a_no_op() {
        let mut animator = CharacterAnimator::default();
        assert_eq!(animator.transition(false), Some(ClipKind::Idle));
        assert_eq!(animator.transition(false), None);
        assert_eq!(animator.transition(true), Some(ClipKind::Walk));
        assert_eq!(animator.transition(true), None);
        assert_eq!(animator.transition(false), Some(ClipKind::Idle));
        assert_eq!(animator.current(), Some(ClipKind::Idle));
    }

    #[test]
    fn clip_lookup_accepts_alternate_names() {
        let clips: HashMap<&str, u32> = HashMap::from([("idle", 1), ("Walking", 2)]);
        assert_eq!(find_clip(ClipKind::Idle, |name| clips.get(name).copied()), Some(1));
        assert_eq!(find_clip(ClipKind::Walk, |name| clips.get(name).copied()), Some(2));

        let capitalised: HashMap<&str, u32> = HashMap::from([("Walk", 3), ("walk", 4)]);
        assert_eq!(
            find_clip(ClipKind::Walk, |name| capitalised.get(name).copied()),
            Some(3)
        );
        assert_eq!(
            find_clip(ClipKind::Idle, |name| capitalised.get(name).copied()),
            None
        );
    }
}
