use crate::geometry::KeyInfo;
use crate::scorer::types::Metric;

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct FlowAnalysis {
    pub is_alternate: bool, // L-R-L or R-L-R
    pub is_roll: bool,      // two keys on one hand, one on the other, no finger repeat
    pub is_onehand: bool,   // one hand, fingers in strict order
    pub is_redirect: bool,  // one hand, three fingers, direction change
}

impl FlowAnalysis {
    pub fn metric(&self) -> Option<Metric> {
        if self.is_alternate {
            Some(Metric::Alt)
        } else if self.is_roll {
            Some(Metric::Rol)
        } else if self.is_onehand {
            Some(Metric::One)
        } else if self.is_redirect {
            Some(Metric::Red)
        } else {
            None
        }
    }
}

pub fn analyze_flow(k1: &KeyInfo, k2: &KeyInfo, k3: &KeyInfo) -> FlowAnalysis {
    let mut res = FlowAnalysis::default();

    if k1.hand == k3.hand && k1.hand != k2.hand {
        res.is_alternate = true;
        return res;
    }

    if k1.hand != k3.hand {
        res.is_roll = k1.finger != k2.finger && k2.finger != k3.finger;
        return res;
    }

    // All three on one hand from here.
    let (f1, f2, f3) = (k1.finger, k2.finger, k3.finger);
    if (f1 < f2 && f2 < f3) || (f1 > f2 && f2 > f3) {
        res.is_onehand = true;
    } else if f1 != f2 && f2 != f3 && f1 != f3 {
        res.is_redirect = true;
    }

    res
}
