//! Input maps: per-frame input vectors keyed by frame name.

use crate::frame::Input;
use crate::system::FrameSystem;
use std::collections::HashMap;

/// Mapping from frame name to that frame's input vector. Zero-DoF frames
/// need no entry.
pub type FrameSystemInputs = HashMap<String, Vec<Input>>;

/// A zero-valued input map covering every moving frame of the system.
pub fn start_positions(system: &FrameSystem) -> FrameSystemInputs {
    let mut map = FrameSystemInputs::new();
    for name in system.frame_names() {
        let frame = system.frame(name).expect("listed frame present");
        let dof = frame.dof().len();
        if dof > 0 {
            map.insert(name.to_owned(), vec![Input(0.0); dof]);
        }
    }
    map
}

/// Component-wise linear blend of two input maps at parameter `t`.
///
/// Purely arithmetic: angles are not wrap-corrected, consistent with
/// interpolation elsewhere in the library. Frames present in only one map
/// keep their values from `a`.
pub fn interpolate_inputs(a: &FrameSystemInputs, b: &FrameSystemInputs, t: f64) -> FrameSystemInputs {
    let mut out = FrameSystemInputs::new();
    for (name, av) in a {
        let blended = match b.get(name) {
            Some(bv) if bv.len() == av.len() => av
                .iter()
                .zip(bv)
                .map(|(x, y)| Input(x.0 + (y.0 - x.0) * t))
                .collect(),
            _ => av.clone(),
        };
        out.insert(name.clone(), blended);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{Frame, Limit};
    use crate::system::WORLD;
    use aksha_spatial::Vector3;

    #[test]
    fn test_start_positions_covers_moving_frames_only() {
        let mut fs = FrameSystem::new();
        fs.add_frame(Frame::new_zero_static("base"), WORLD).unwrap();
        fs.add_frame(
            Frame::new_rotational("j1", Vector3::Z, Limit::new(-1.0, 1.0)).unwrap(),
            "base",
        )
        .unwrap();
        fs.add_frame(
            Frame::new_mobile_2d(
                "rover",
                &[Limit::new(-5.0, 5.0), Limit::new(-5.0, 5.0)],
                None,
            )
            .unwrap(),
            WORLD,
        )
        .unwrap();

        let map = start_positions(&fs);
        assert!(!map.contains_key("base"));
        assert_eq!(map["j1"], vec![Input(0.0)]);
        assert_eq!(map["rover"], vec![Input(0.0), Input(0.0)]);
    }

    #[test]
    fn test_interpolate_inputs_linear() {
        let mut a = FrameSystemInputs::new();
        a.insert("j".to_owned(), vec![Input(0.0), Input(2.0)]);
        let mut b = FrameSystemInputs::new();
        b.insert("j".to_owned(), vec![Input(1.0), Input(4.0)]);

        let mid = interpolate_inputs(&a, &b, 0.5);
        assert!((mid["j"][0].0 - 0.5).abs() < 1e-12);
        assert!((mid["j"][1].0 - 3.0).abs() < 1e-12);

        // t is not clamped conceptually, but endpoints reproduce exactly.
        let end = interpolate_inputs(&a, &b, 1.0);
        assert!((end["j"][0].0 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_interpolate_inputs_missing_counterpart() {
        let mut a = FrameSystemInputs::new();
        a.insert("only".to_owned(), vec![Input(3.0)]);
        let b = FrameSystemInputs::new();
        let out = interpolate_inputs(&a, &b, 0.5);
        assert_eq!(out["only"], vec![Input(3.0)]);
    }
}
