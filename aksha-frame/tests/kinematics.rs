//! End-to-end kinematics scenarios: assembled frame systems queried the way
//! planners and collision checkers use them.

use aksha_frame::{
    check_collisions, start_positions, Frame, FrameConfig, FrameSystem, FrameSystemInputs,
    GeometriesInFrame, Input, Limit, WorldState, FrameError, OOB_ERR_STRING, WORLD,
};
use aksha_spatial::{Geometry, Pose, Vector3};
use std::f64::consts::{FRAC_PI_2, PI};

fn static_at(name: &str, v: Vector3) -> Frame {
    Frame::new_static(name, Pose::from_translation(v))
}

#[test]
fn static_chain_composes_translations() {
    // world -> A (translate +1 on x) -> B (translate +2 on y).
    let mut fs = FrameSystem::new();
    fs.add_frame(static_at("A", Vector3::new(1.0, 0.0, 0.0)), WORLD)
        .unwrap();
    fs.add_frame(static_at("B", Vector3::new(0.0, 2.0, 0.0)), "A")
        .unwrap();

    let (pose, oob) = fs.transform(&FrameSystemInputs::new(), "B", WORLD).unwrap();
    assert!(oob.is_none());
    assert!(pose
        .translation
        .approx_eq(&Vector3::new(1.0, 2.0, 0.0), 1e-12));
    assert!(pose
        .quaternion()
        .approx_eq(&aksha_spatial::Quaternion::IDENTITY, 1e-12));
}

#[test]
fn revolute_joint_swings_the_tool() {
    // world -> J (rotational, axis +z) -> T (static, translate +1 on x);
    // with J at pi/2 the tool sits at roughly (0, 1, 0).
    let mut fs = FrameSystem::new();
    fs.add_frame(
        Frame::new_rotational("J", Vector3::Z, Limit::new(-PI, PI)).unwrap(),
        WORLD,
    )
    .unwrap();
    fs.add_frame(static_at("T", Vector3::new(1.0, 0.0, 0.0)), "J")
        .unwrap();

    let mut inputs = FrameSystemInputs::new();
    inputs.insert("J".to_owned(), vec![Input(FRAC_PI_2)]);
    let (pose, oob) = fs.transform(&inputs, "T", WORLD).unwrap();
    assert!(oob.is_none());
    assert!(pose
        .translation
        .approx_eq(&Vector3::new(0.0, 1.0, 0.0), 1e-9));
}

#[test]
fn out_of_bounds_input_is_tolerated_with_error() {
    // Translational frame limited to [0, 10]; an input of 15 still lands at
    // 15 along the axis, with the violation reported beside the pose.
    let mut fs = FrameSystem::new();
    fs.add_frame(
        Frame::new_translational("slide", Vector3::X, Limit::new(0.0, 10.0)).unwrap(),
        WORLD,
    )
    .unwrap();

    let mut inputs = FrameSystemInputs::new();
    inputs.insert("slide".to_owned(), vec![Input(15.0)]);
    let (pose, oob) = fs.transform(&inputs, "slide", WORLD).unwrap();
    assert!(pose
        .translation
        .approx_eq(&Vector3::new(15.0, 0.0, 0.0), 1e-12));
    let err = oob.expect("an out-of-bounds input must report an error");
    assert!(err.to_string().contains(OOB_ERR_STRING));

    // The same query inside the limits is clean, and the pose matches what
    // the unrestricted transform produced scaled down.
    inputs.insert("slide".to_owned(), vec![Input(5.0)]);
    let (_, oob) = fs.transform(&inputs, "slide", WORLD).unwrap();
    assert!(oob.is_none());
}

#[test]
fn mobile_2d_frame_moves_in_plane() {
    let limits = [Limit::new(-5.0, 5.0), Limit::new(-5.0, 5.0)];
    let mut fs = FrameSystem::new();
    fs.add_frame(Frame::new_mobile_2d("rover", &limits, None).unwrap(), WORLD)
        .unwrap();

    let mut inputs = FrameSystemInputs::new();
    inputs.insert("rover".to_owned(), vec![Input(3.0), Input(4.0)]);
    let (pose, oob) = fs.transform(&inputs, "rover", WORLD).unwrap();
    assert!(oob.is_none());
    assert!(pose
        .translation
        .approx_eq(&Vector3::new(3.0, 4.0, 0.0), 1e-12));
}

#[test]
fn re_adding_a_frame_under_its_descendant_is_a_cycle() {
    let mut fs = FrameSystem::new();
    fs.add_frame(static_at("A", Vector3::X), WORLD).unwrap();
    fs.add_frame(static_at("mid", Vector3::Y), "A").unwrap();
    fs.add_frame(static_at("B", Vector3::Z), "mid").unwrap();

    let err = fs.add_frame(static_at("A", Vector3::X), "B").unwrap_err();
    assert!(matches!(err, FrameError::CycleDetected(_)));
    assert!(err.to_string().contains("cycle detected"));
}

#[test]
fn transform_invariants_hold_along_a_mixed_chain() {
    // world -> base -> J (revolute) -> arm -> slide (prismatic) -> tip,
    // with a branch world -> post.
    let mut fs = FrameSystem::new();
    fs.add_frame(static_at("base", Vector3::new(2.0, 0.0, 1.0)), WORLD)
        .unwrap();
    fs.add_frame(
        Frame::new_rotational("J", Vector3::Z, Limit::new(-PI, PI)).unwrap(),
        "base",
    )
    .unwrap();
    fs.add_frame(static_at("arm", Vector3::new(5.0, 0.0, 0.0)), "J")
        .unwrap();
    fs.add_frame(
        Frame::new_translational("slide", Vector3::Y, Limit::new(-10.0, 10.0)).unwrap(),
        "arm",
    )
    .unwrap();
    fs.add_frame(static_at("tip", Vector3::new(0.5, 0.0, 0.0)), "slide")
        .unwrap();
    fs.add_frame(static_at("post", Vector3::new(0.0, 7.0, 0.0)), WORLD)
        .unwrap();

    let mut inputs = start_positions(&fs);
    inputs.insert("J".to_owned(), vec![Input(0.8)]);
    inputs.insert("slide".to_owned(), vec![Input(-3.5)]);

    // Invariant 1: Transform(i, a, a) is the identity.
    for name in ["tip", "post", WORLD] {
        let (pose, _) = fs.transform(&inputs, name, name).unwrap();
        assert!(pose.approx_eq(&Pose::IDENTITY, 1e-12));
    }

    // Invariant 2: Transform(i, a, b) inverts Transform(i, b, a).
    let (ab, _) = fs.transform(&inputs, "tip", "post").unwrap();
    let (ba, _) = fs.transform(&inputs, "post", "tip").unwrap();
    assert!(ab.approx_eq(&ba.inverse(), 1e-10));

    // Invariant 3: composing through an intermediate frame changes nothing.
    let (ac, _) = fs.transform(&inputs, "tip", "post").unwrap();
    let (to_mid, _) = fs.transform(&inputs, "tip", "arm").unwrap();
    let (mid_on, _) = fs.transform(&inputs, "arm", "post").unwrap();
    assert!(mid_on.compose(&to_mid).approx_eq(&ac, 1e-10));
}

#[test]
fn rotation_by_halves_equals_full_rotation() {
    let mut fs = FrameSystem::new();
    fs.add_frame(
        Frame::new_rotational("J", Vector3::new(1.0, 1.0, 0.0), Limit::new(-PI, PI)).unwrap(),
        WORLD,
    )
    .unwrap();

    let mut half = FrameSystemInputs::new();
    half.insert("J".to_owned(), vec![Input(0.6)]);
    let mut full = FrameSystemInputs::new();
    full.insert("J".to_owned(), vec![Input(1.2)]);

    let (h, _) = fs.transform(&half, "J", WORLD).unwrap();
    let (f, _) = fs.transform(&full, "J", WORLD).unwrap();
    assert!(h.compose(&h).approx_eq(&f, 1e-12));
}

#[test]
fn no_geometry_wrapper_reports_nothing_system_wide() {
    let hull = Geometry::new_box(Pose::IDENTITY, Vector3::new(1.0, 1.0, 1.0), "hull").unwrap();
    let wrapped = Frame::without_geometry(Frame::new_static_with_geometry(
        "link",
        Pose::from_translation(Vector3::X),
        hull,
    ));

    let mut fs = FrameSystem::new();
    fs.add_frame(wrapped, WORLD).unwrap();
    let (gif, _) = fs.geometries(&FrameSystemInputs::new(), "link").unwrap();
    assert!(gif.geometries().is_empty());
}

#[test]
fn add_then_remove_subtree_restores_the_system() {
    let mut fs = FrameSystem::new();
    fs.add_frame(static_at("persistent", Vector3::X), WORLD)
        .unwrap();
    let names_before = fs
        .frame_names()
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>();

    fs.add_frame(static_at("attachment", Vector3::Y), "persistent")
        .unwrap();
    fs.add_frame(static_at("sensor", Vector3::Z), "attachment")
        .unwrap();
    fs.remove_frame("attachment").unwrap();

    assert_eq!(fs.frame_names(), names_before);
    assert_eq!(fs.children("persistent"), Vec::<&str>::new());
}

#[test]
fn frame_configs_assemble_into_a_working_system() {
    // A parsed config document: a revolute joint and a link hanging off it.
    let doc = r#"[
        {"id": "J", "type": "revolute", "axis": {"x": 0.0, "y": 0.0, "z": 1.0},
         "max": 180.0, "min": -180.0},
        {"id": "tool", "parent": "J",
         "translation": {"x": 1.0, "y": 0.0, "z": 0.0},
         "orientation": {"type": "euler_angles",
                         "value": {"roll": 0.0, "pitch": 0.0, "yaw": 0.0}}}
    ]"#;
    let configs: Vec<FrameConfig> = serde_json::from_str(doc).unwrap();

    let mut fs = FrameSystem::new();
    for cfg in &configs {
        let parent = cfg.parent().unwrap_or(WORLD).to_owned();
        fs.add_frame(cfg.to_frame().unwrap(), &parent).unwrap();
    }

    let mut inputs = FrameSystemInputs::new();
    inputs.insert("J".to_owned(), vec![Input(FRAC_PI_2)]);
    let (pose, _) = fs.transform(&inputs, "tool", WORLD).unwrap();
    assert!(pose
        .translation
        .approx_eq(&Vector3::new(0.0, 1.0, 0.0), 1e-9));

    // Round-trip: every frame re-parses into an almost-equal twin.
    for name in fs.frame_names() {
        let frame = fs.frame(name).unwrap();
        let text = serde_json::to_string(&frame.to_config().unwrap()).unwrap();
        let reparsed: FrameConfig = serde_json::from_str(&text).unwrap();
        assert!(reparsed.to_frame().unwrap().almost_equals(frame));
    }
}

#[test]
fn world_state_obstacles_collide_with_robot_geometry() {
    // A wall-like box at the world origin and a robot hand approaching it.
    let mut fs = FrameSystem::new();
    fs.add_frame(
        Frame::new_translational_with_geometry(
            "hand",
            Vector3::X,
            Limit::new(-100.0, 100.0),
            Some(Geometry::new_box(Pose::IDENTITY, Vector3::new(0.5, 0.5, 0.5), "hand").unwrap()),
        )
        .unwrap(),
        WORLD,
    )
    .unwrap();

    let wall = Geometry::new_box(Pose::IDENTITY, Vector3::new(0.5, 10.0, 0.5), "wall").unwrap();
    let ws = WorldState::new(vec![GeometriesInFrame::new(WORLD, vec![wall])], vec![]).unwrap();

    // Resolve everything into the hand's frame and sweep for contacts.
    let check = |x: f64| -> Vec<(String, String)> {
        let mut inputs = FrameSystemInputs::new();
        inputs.insert("hand".to_owned(), vec![Input(x)]);
        let (gif, _) = fs.geometries(&inputs, "hand").unwrap();
        let (obstacles, _) = ws.obstacles_in_frame(&fs, &inputs, "hand").unwrap();
        let mut all = gif.geometries().to_vec();
        for o in &obstacles {
            all.extend(o.geometries().iter().cloned());
        }
        check_collisions(&all).unwrap()
    };

    // Nudged into the wall: contact. Far away: clear.
    assert_eq!(
        check(0.4),
        vec![("hand".to_owned(), "wall".to_owned())]
    );
    assert!(check(5.0).is_empty());
}
