use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub struct vec2_base<T> {
    pub x: T,
    pub y: T,
}

impl<T: Copy + Clone> vec2_base<T> {
    pub fn new(x: T, y: T) -> vec2_base<T> {
        vec2_base::<T> { x, y }
    }
}

impl<T: Copy + Clone + Neg<Output = T>> Neg for vec2_base<T> {
    type Output = vec2_base<T>;

    fn neg(self) -> Self::Output {
        Self {
            x: -self.x,
            y: -self.y,
        }
    }
}

impl<T: Copy + Clone + Mul<Output = T>> Mul<T> for vec2_base<T> {
    type Output = vec2_base<T>;

    fn mul(self, rhs: T) -> Self::Output {
        Self {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}

impl<T: Copy + Clone + MulAssign<T>> MulAssign<T> for vec2_base<T> {
    fn mul_assign(&mut self, rhs: T) {
        self.x *= rhs;
        self.y *= rhs;
    }
}

impl<T: Copy + Clone + Div<Output = T>> Div<T> for vec2_base<T> {
    type Output = vec2_base<T>;

    fn div(self, rhs: T) -> Self::Output {
        Self {
            x: self.x / rhs,
            y: self.y / rhs,
        }
    }
}

impl<T: Copy + Clone + DivAssign<T>> DivAssign<T> for vec2_base<T> {
    fn div_assign(&mut self, rhs: T) {
        self.x /= rhs;
        self.y /= rhs;
    }
}

impl<T: Copy + Clone + Add<Output = T>> Add<vec2_base<T>> for vec2_base<T> {
    type Output = vec2_base<T>;

    fn add(self, rhs: vec2_base<T>) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl<T: Copy + Clone + AddAssign<T>> AddAssign<vec2_base<T>> for vec2_base<T> {
    fn add_assign(&mut self, rhs: vec2_base<T>) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl<T: Copy + Clone + Sub<Output = T>> Sub<vec2_base<T>> for vec2_base<T> {
    type Output = vec2_base<T>;

    fn sub(self, rhs: vec2_base<T>) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl<T: Copy + Clone + SubAssign<T>> SubAssign<vec2_base<T>> for vec2_base<T> {
    fn sub_assign(&mut self, rhs: vec2_base<T>) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

#[allow(non_camel_case_types)]
pub type vec2 = vec2_base<f32>;
#[allow(non_camel_case_types)]
pub type dvec2 = vec2_base<f64>;
#[allow(non_camel_case_types)]
pub type ivec2 = vec2_base<i32>;
