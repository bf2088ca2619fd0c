use mmesh_core::geometry::Point;
use mmesh_core::quadrature::{polygon_rule, segment_rule, triangle_rule};
use mmesh_core::QuadratureError;

fn unit_triangle() -> [Point; 3] {
    [Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(0.0, 1.0)]
}

#[test]
fn triangle_rules_integrate_monomials_exactly() {
    let t = unit_triangle();

    // Integral of x^a y^b over the unit triangle is a! b! / (a + b + 2)!.
    let cases: &[(usize, i32, i32, f64)] = &[
        (0, 0, 0, 0.5),
        (1, 1, 0, 1.0 / 6.0),
        (2, 2, 0, 1.0 / 12.0),
        (2, 1, 1, 1.0 / 24.0),
        (4, 2, 2, 1.0 / 180.0),
        (4, 4, 0, 1.0 / 30.0),
    ];

    for &(degree, a, b, exact) in cases {
        let rule = triangle_rule(&t, degree).unwrap();
        let got = rule.integrate(|p| p.x.powi(a) * p.y.powi(b));
        assert!((got - exact).abs() < 1e-12, "degree {degree}: x^{a} y^{b} gave {got}, want {exact}");
    }
}

#[test]
fn polygon_rule_weights_sum_to_area() {
    let square = [
        Point::new(0.0, 0.0),
        Point::new(2.0, 0.0),
        Point::new(2.0, 1.0),
        Point::new(0.0, 1.0),
    ];
    let rule = polygon_rule(&square, 2).unwrap();
    assert!((rule.total_weight() - 2.0).abs() < 1e-12);
    assert!((rule.integrate(|p| p.x) - 2.0).abs() < 1e-12);
}

#[test]
fn segment_rule_is_gauss_legendre() {
    let a = Point::new(0.0, 0.0);
    let b = Point::new(3.0, 4.0);

    let rule = segment_rule(a, b, 5).unwrap();
    assert_eq!(rule.len(), 3);
    assert!((rule.total_weight() - 5.0).abs() < 1e-12);

    // s^5 along the arc-length parameter s in [0, 5].
    let got = rule.integrate(|p| p.norm().powi(5));
    assert!((got - 5.0_f64.powi(6) / 6.0).abs() < 1e-8);
}

#[test]
fn unsupported_degrees_are_errors() {
    assert_eq!(
        triangle_rule(&unit_triangle(), 5).unwrap_err(),
        QuadratureError::UnsupportedDegree { shape: "triangle", degree: 5, max: 4 }
    );
    assert!(segment_rule(Point::new(0.0, 0.0), Point::new(1.0, 0.0), 6).is_err());
}
