use std::f64::consts::PI;

use lazy_static::lazy_static;

const N: usize = 8;

lazy_static! {
    /// `COSINES[k][n] = cos((2n + 1)kπ / 16)`，正反变换共用。
    static ref COSINES: [[f64; N]; N] = {
        let mut table = [[0_f64; N]; N];
        for (k, row) in table.iter_mut().enumerate() {
            for (n, value) in row.iter_mut().enumerate() {
                *value = (((2 * n + 1) * k) as f64 * PI / (2 * N) as f64).cos();
            }
        }
        table
    };
}

/// 正交归一化因子。`factor(u) * factor(v)` 等于 `1/4 * α(u) * α(v)`。
fn factor(k: usize) -> f64 {
    if k == 0 {
        (1.0 / N as f64).sqrt()
    } else {
        (2.0 / N as f64).sqrt()
    }
}

/// 二维 DCT-II，先按行再按列，两次一维变换。
/// 输入应已减去 128。
pub fn dct(input: &[[f64; N]; N]) -> [[f64; N]; N] {
    let mut one = [[0_f64; N]; N];
    let mut ret = [[0_f64; N]; N];

    for x in 0..N {
        for v in 0..N {
            for y in 0..N {
                one[x][v] += input[x][y] * COSINES[v][y];
            }
            one[x][v] *= factor(v);
        }
    }

    for v in 0..N {
        for u in 0..N {
            for x in 0..N {
                ret[u][v] += one[x][v] * COSINES[u][x];
            }
            ret[u][v] *= factor(u);
        }
    }

    ret
}

/// 二维 DCT-III，是 `dct` 的精确逆变换（不计浮点误差）。
pub fn idct(input: &[[f64; N]; N]) -> [[f64; N]; N] {
    let mut one = [[0_f64; N]; N];
    let mut ret = [[0_f64; N]; N];

    for x in 0..N {
        for v in 0..N {
            for u in 0..N {
                one[x][v] += factor(u) * input[u][v] * COSINES[u][x];
            }
        }
    }

    for x in 0..N {
        for y in 0..N {
            for v in 0..N {
                ret[x][y] += factor(v) * one[x][v] * COSINES[v][y];
            }
        }
    }

    ret
}

#[cfg(test)]
mod test {
    use super::*;

    use approx::assert_abs_diff_eq;

    // https://blog.csdn.net/weixin_44874766/article/details/117444843
    const DU_TABLE: [[i32; 8]; 8] = [
        [-76, -73, -67, -62, -58, -67, -64, -55],
        [-65, -69, -73, -38, -19, -43, -59, -56],
        [-66, -69, -60, -15, 16, -24, -62, -55],
        [-65, -70, -57, -6, 26, -22, -58, -59],
        [-61, -67, -60, -24, -2, -40, -60, -58],
        [-49, -63, -68, -58, -51, -60, -70, -53],
        [-43, -57, -64, -69, -73, -67, -63, -45],
        [-41, -49, -59, -60, -63, -52, -50, -34],
    ];

    fn to_f64(table: &[[i32; 8]; 8]) -> [[f64; 8]; 8] {
        table.map(|row| row.map(|it| it as f64))
    }

    #[test]
    fn test_dct() {
        const DCT_DU_TABLE: [[i32; 8]; 8] = [
            [-415, -30, -61, 27, 56, -20, -2, 0],
            [4, -22, -61, 10, 13, -7, -9, 5],
            [-47, 7, 77, -25, -29, 10, 5, -6],
            [-49, 12, 34, -15, -10, 6, 2, 2],
            [12, -7, -13, -4, -2, 2, -3, 3],
            [-8, 3, 2, -6, -2, 1, 4, 2],
            [-1, 0, 0, -2, -1, -3, 4, -1],
            [0, 0, -1, -4, -1, 0, 1, 2],
        ];

        let output = dct(&to_f64(&DU_TABLE)).map(|row| row.map(|it| it.round() as i32));

        assert_eq!(output, DCT_DU_TABLE);
    }

    #[test]
    fn test_idct_inverts_dct() {
        let input = to_f64(&DU_TABLE);
        let output = idct(&dct(&input));

        for x in 0..N {
            for y in 0..N {
                assert_abs_diff_eq!(output[x][y], input[x][y], epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_constant_block_is_dc_only() {
        let output = dct(&[[12.0; N]; N]);

        assert_abs_diff_eq!(output[0][0], 96.0, epsilon = 1e-9);
        for u in 0..N {
            for v in 0..N {
                if u + v != 0 {
                    assert_abs_diff_eq!(output[u][v], 0.0, epsilon = 1e-9);
                }
            }
        }
    }
}
