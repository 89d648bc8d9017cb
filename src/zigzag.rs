use lazy_static::lazy_static;

use crate::block::Du;

fn generate_zigzag_order() -> [(usize, usize); 64] {
    let mut ret = [(0, 0); 64];

    let mut x = 0;
    let mut y = 0;
    let mut idx = 0;

    while idx < ret.len() {
        while idx < ret.len() {
            ret[idx] = (x, y);
            idx += 1;
            // 优先处理 y == 7，因为有对角线。
            if y == 7 {
                x += 1;
                break;
            } else if x == 0 {
                y += 1;
                break;
            } else {
                x -= 1;
                y += 1;
            }
        }
        while idx < ret.len() {
            ret[idx] = (x, y);
            idx += 1;
            // 优先处理 x == 7，因为有对角线。
            if x == 7 {
                y += 1;
                break;
            } else if y == 0 {
                x += 1;
                break;
            } else {
                x += 1;
                y -= 1;
            }
        }
    }

    ret
}

lazy_static! {
    /// 第 i 个 Zigzag 位置对应的 (行, 列)。正反扫描都只查这一张表。
    pub static ref ZIGZAG_ORDER: [(usize, usize); 64] = generate_zigzag_order();
}

impl Du {
    pub fn zigzag(&self) -> [i32; 64] {
        let mut ret = [0_i32; 64];
        for (idx, &(x, y)) in ZIGZAG_ORDER.iter().enumerate() {
            ret[idx] = self.0[x][y];
        }
        ret
    }

    pub fn from_zigzag(input: &[i32; 64]) -> Du {
        let mut ret = [[0_i32; 8]; 8];
        for (idx, &(x, y)) in ZIGZAG_ORDER.iter().enumerate() {
            ret[x][y] = input[idx];
        }
        Du(ret)
    }
}
