use serde::Serialize;

/// A bounded stat such as hit points or mana, kept within `[0, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Stat {
    pub value: i32,
    pub max: i32,
}

impl Stat {
    pub fn new(value: i32, max: i32) -> Self {
        Self { value: value.clamp(0, max), max }
    }

    pub fn full(max: i32) -> Self {
        Self::new(max, max)
    }

    pub fn add(&mut self, amount: i32) {
        self.value = (self.value + amount).clamp(0, self.max);
    }

    pub fn sub(&mut self, amount: i32) {
        self.add(-amount);
    }

    pub fn is_empty(&self) -> bool {
        self.value == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stat_is_clamped() {
        let mut hp = Stat::new(5, 10);
        hp.add(20);
        assert_eq!(hp.value, 10);
        hp.sub(50);
        assert_eq!(hp.value, 0);
        assert!(hp.is_empty());
    }
}
