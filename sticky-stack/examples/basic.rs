// Example: three headers scrolled past, read back as a stack.
use sticky_stack::{Geometry, GeometrySource, StackOptions, StickyStack};

struct Snapshot {
    scroll: u64,
    // (height, document offset) per handle
    layout: Vec<(u32, u64)>,
}

impl GeometrySource<usize> for Snapshot {
    fn measure(&self, handle: &usize) -> Option<Geometry> {
        let &(height, offset_top) = self.layout.get(*handle)?;
        Some(Geometry {
            height,
            offset_top,
            bounding_top: offset_top as i64 - self.scroll as i64,
        })
    }

    fn scroll_top(&self) -> u64 {
        self.scroll
    }
}

fn main() {
    let mut stack = StickyStack::new(StackOptions::new());

    // Handles 0/1, 2/3, 4/5 are header/padding pairs.
    let ids = [stack.attach(0, 1), stack.attach(2, 3), stack.attach(4, 5)];
    let snapshot = Snapshot {
        scroll: 700,
        layout: vec![(40, 0), (0, 0), (60, 240), (0, 240), (50, 500), (0, 500)],
    };

    let report = stack.evaluate(&snapshot);
    println!("report={report:?}");
    for id in ids {
        println!("{id}: {:?} {:?}", stack.stacking(id), stack.placement(id));
    }
    println!("stack_height={}", stack.stack_height());
}
