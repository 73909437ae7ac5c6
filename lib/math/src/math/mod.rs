use self::vector::{vec2, vec2_base};

pub mod vector;

#[allow(non_upper_case_globals)]
pub const PId: f64 = 3.1415926535897932384626433;
pub const PI: f32 = PId as f32;

pub fn mix<T, TB>(a: &T, b: &T, amount: TB) -> T
where
    T: std::ops::Sub<T, Output = T>
        + std::ops::Add<T, Output = T>
        + std::ops::Mul<TB, Output = T>
        + Copy,
{
    *a + (*b - *a) * amount
}

pub fn dot<T>(a: &vec2_base<T>, b: &vec2_base<T>) -> T
where
    T: Copy + std::ops::Mul<T, Output = T> + std::ops::Add<T, Output = T>,
{
    a.x * b.x + a.y * b.y
}

pub fn length<T>(a: &vec2_base<T>) -> T
where
    T: Copy + std::ops::Mul<T, Output = T> + std::ops::Add<T, Output = T> + num_traits::Float,
{
    (dot(a, a)).sqrt()
}

pub fn normalize<T>(v: &vec2_base<T>) -> vec2_base<T>
where
    T: Default
        + Copy
        + std::ops::Mul<T, Output = T>
        + std::ops::Div<T, Output = T>
        + std::ops::Add<T, Output = T>
        + num_traits::Float,
{
    let divisor = length(v);
    if divisor == T::zero() {
        vec2_base::<T>::default()
    } else {
        let l = T::one() / divisor;
        vec2_base::<T>::new(v.x * l, v.y * l)
    }
}

pub fn distance(a: &vec2, b: &vec2) -> f32 {
    length(&(*a - *b))
}

pub fn distance_squared(a: &vec2, b: &vec2) -> f32 {
    let diff = *a - *b;
    dot(&diff, &diff)
}

pub fn round_to_int(f: f32) -> i32 {
    if f > 0.0 {
        (f + 0.5) as i32
    } else {
        (f - 0.5) as i32
    }
}

/// Projects `point` onto the segment `line_point_a..line_point_b`.
/// Returns false if the segment is degenerate.
pub fn closest_point_on_line(
    line_point_a: &vec2,
    line_point_b: &vec2,
    point: &vec2,
    out_pos: &mut vec2,
) -> bool {
    let seg = *line_point_b - *line_point_a;
    let seg_len_sq = dot(&seg, &seg);
    if seg_len_sq > 0.0 {
        let t = (dot(&(*point - *line_point_a), &seg) / seg_len_sq).clamp(0.0, 1.0);
        *out_pos = *line_point_a + seg * t;
        return true;
    }
    false
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn round_to_int_rounds_half_away_from_zero() {
        assert_eq!(round_to_int(12.75), 13);
        assert_eq!(round_to_int(-12.75), -13);
        assert_eq!(round_to_int(3219.25), 3219);
        assert_eq!(round_to_int(0.5), 1);
        assert_eq!(round_to_int(-0.5), -1);
        assert_eq!(round_to_int(3500.0), 3500);
    }

    #[test]
    fn closest_point_clamps_to_segment() {
        let a = vec2::new(0.0, 0.0);
        let b = vec2::new(10.0, 0.0);
        let mut out = vec2::default();
        assert!(closest_point_on_line(&a, &b, &vec2::new(5.0, 3.0), &mut out));
        assert_eq!(out, vec2::new(5.0, 0.0));
        assert!(closest_point_on_line(&a, &b, &vec2::new(20.0, 3.0), &mut out));
        assert_eq!(out, vec2::new(10.0, 0.0));
    }
}
