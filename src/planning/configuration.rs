//! Box layout snapshots and the single-coordinate moves between them

use crate::common::MovableBox;
pub use crate::geometry::Axis;

/// Stable index of one physical movable object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// Goal-bound box
    Box(usize),
    /// Movable obstacle
    Obstacle(usize),
}

/// Move label: slot `slot` gets coordinate `value` on `axis`, nothing else changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChangeLog {
    pub slot: Slot,
    pub axis: Axis,
    pub value: f64,
}

impl ChangeLog {
    pub fn new(slot: Slot, axis: Axis, value: f64) -> Self {
        Self { slot, axis, value }
    }
}

/// Positions of every movable box and obstacle at one node of the roadmap.
///
/// Slot order never changes during a planning run. Values are never
/// mutated once built; `with_change` produces a new snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    boxes: Vec<MovableBox>,
    obstacles: Vec<MovableBox>,
}

impl Configuration {
    pub fn new(boxes: Vec<MovableBox>, obstacles: Vec<MovableBox>) -> Self {
        Self { boxes, obstacles }
    }

    pub fn boxes(&self) -> &[MovableBox] {
        &self.boxes
    }

    pub fn obstacles(&self) -> &[MovableBox] {
        &self.obstacles
    }

    pub fn get(&self, slot: Slot) -> Option<&MovableBox> {
        match slot {
            Slot::Box(i) => self.boxes.get(i),
            Slot::Obstacle(i) => self.obstacles.get(i),
        }
    }

    /// Every slot with its box, goal boxes first
    pub fn objects(&self) -> impl Iterator<Item = (Slot, &MovableBox)> + '_ {
        let boxes = self.boxes.iter().enumerate().map(|(i, b)| (Slot::Box(i), b));
        let obstacles = self
            .obstacles
            .iter()
            .enumerate()
            .map(|(i, b)| (Slot::Obstacle(i), b));
        boxes.chain(obstacles)
    }

    pub fn slot_count(&self) -> usize {
        self.boxes.len() + self.obstacles.len()
    }

    /// Same slot layout as `other`
    pub fn is_compatible(&self, other: &Configuration) -> bool {
        self.boxes.len() == other.boxes.len() && self.obstacles.len() == other.obstacles.len()
    }

    /// New snapshot with `change` applied. An out-of-range slot leaves the
    /// layout unchanged.
    pub fn with_change(&self, change: &ChangeLog) -> Configuration {
        let mut next = self.clone();
        let target = match change.slot {
            Slot::Box(i) => next.boxes.get_mut(i),
            Slot::Obstacle(i) => next.obstacles.get_mut(i),
        };
        if let Some(b) = target {
            *b = b.with_position(change.axis.set(&b.position, change.value));
        }
        next
    }

    /// Slots whose position differs from `other`, with the differing axes
    pub fn differences(&self, other: &Configuration) -> Vec<(Slot, Vec<Axis>)> {
        self.objects()
            .zip(other.objects())
            .filter_map(|((slot, a), (_, b))| {
                let axes: Vec<Axis> = [Axis::X, Axis::Y]
                    .iter()
                    .copied()
                    .filter(|axis| axis.of(&a.position) != axis.of(&b.position))
                    .collect();
                if axes.is_empty() {
                    None
                } else {
                    Some((slot, axes))
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Point2D;

    fn layout() -> Configuration {
        Configuration::new(
            vec![MovableBox::new(Point2D::new(0.1, 0.1), 0.1)],
            vec![MovableBox::new(Point2D::new(0.5, 0.5), 0.2)],
        )
    }

    #[test]
    fn test_with_change_touches_one_coordinate() {
        let before = layout();
        let after = before.with_change(&ChangeLog::new(Slot::Obstacle(0), Axis::Y, 0.7));
        assert_eq!(after.obstacles()[0].position, Point2D::new(0.5, 0.7));
        assert_eq!(before.obstacles()[0].position, Point2D::new(0.5, 0.5));
        assert_eq!(after.differences(&before), vec![(Slot::Obstacle(0), vec![Axis::Y])]);
    }

    #[test]
    fn test_objects_order() {
        let slots: Vec<Slot> = layout().objects().map(|(slot, _)| slot).collect();
        assert_eq!(slots, vec![Slot::Box(0), Slot::Obstacle(0)]);
    }

    #[test]
    fn test_out_of_range_change_is_ignored() {
        let before = layout();
        let after = before.with_change(&ChangeLog::new(Slot::Box(3), Axis::X, 0.9));
        assert_eq!(before, after);
    }
}
