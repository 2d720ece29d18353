use super::*;

#[test]
fn normalize_of_zero_is_zero() {
    assert_eq!(FixedVec2::ZERO.normalize(), FixedVec2::ZERO);
}

#[test]
fn clamp_length_only_shrinks() {
    let v = FixedVec2::new(fx(3.0), fx(4.0));
    assert_eq!(v.clamp_length(fx(10.0)), v);

    let clamped = v.clamp_length(fx(1.0));
    assert!((clamped.length() - fx(1.0)).abs() < fx(0.001));
}

#[test]
fn move_towards_never_overshoots() {
    assert_eq!(move_towards(fx(3.0), fx(1.2), fx(0.5)), fx(2.5));
    assert_eq!(move_towards(fx(1.3), fx(1.2), fx(0.5)), fx(1.2));
    assert_eq!(move_towards(fx(1.0), fx(2.0), fx(0.25)), fx(1.25));
}

#[test]
fn perp_is_left_normal() {
    let right = FixedVec2::new(fx(1.0), FixedNum::ZERO);
    assert_eq!(right.perp(), FixedVec2::new(FixedNum::ZERO, fx(1.0)));
    assert_eq!(right.dot(right.perp()), FixedNum::ZERO);
}

#[test]
fn from_angle_quarter_turns() {
    let left = FixedVec2::from_angle(std::f64::consts::PI);
    assert!((left.x + fx(1.0)).abs() < fx(0.0001));
    assert!(left.y.abs() < fx(0.0001));
}

#[test]
fn short_vectors_normalize_to_unit_length() {
    let cases = [(0.0005, 0.0), (0.001, 0.001), (-0.0007, 0.0003), (0.0, -0.002), (0.00003, -0.00002)];
    for (x, y) in cases {
        let v = FixedVec2::new(fx(x), fx(y));
        assert!(!v.is_zero());
        let unit = v.normalize();
        assert!((unit.length() - fx(1.0)).abs() < fx(0.001), "|normalize({x}, {y})| = {}", unit.length());
        assert!(unit.dot(v) > FixedNum::ZERO, "normalize({x}, {y}) flipped direction");
    }
}

#[test]
fn short_vector_length_keeps_precision() {
    let v = FixedVec2::new(fx(0.003), fx(0.004));
    assert!((v.length() - fx(0.005)).abs() < fx(0.0001));
}

#[test]
fn long_vector_length_does_not_overflow() {
    let v = FixedVec2::new(fx(3.0e7), fx(4.0e7));
    assert!((v.length() - fx(5.0e7)).abs() < fx(10.0));
}
