//! NumPy-style broadcasting for dynamic-dimensional `ndarray` views.
//!
//! Shapes are right-aligned; each pair of dimensions must be equal or one of
//! them must be 1. Missing leading dimensions count as 1.

use ndarray::{ArrayD, ArrayViewD, Axis, IxDyn, Zip};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BroadcastError {
    #[error("operands with shapes {lhs:?} and {rhs:?} cannot be broadcast together")]
    Incompatible { lhs: Vec<usize>, rhs: Vec<usize> },
    #[error("{len} mapped values do not fill broadcast shape {shape:?}")]
    Layout { shape: Vec<usize>, len: usize },
}

pub fn broadcast_shape(lhs: &[usize], rhs: &[usize]) -> Result<Vec<usize>, BroadcastError> {
    let ndim = lhs.len().max(rhs.len());
    let mut shape = vec![1; ndim];

    for (offset, slot) in shape.iter_mut().rev().enumerate() {
        let left = dim_from_right(lhs, offset);
        let right = dim_from_right(rhs, offset);
        *slot = match (left, right) {
            (l, r) if l == r => l,
            (1, r) => r,
            (l, 1) => l,
            _ => {
                return Err(BroadcastError::Incompatible {
                    lhs: lhs.to_vec(),
                    rhs: rhs.to_vec(),
                });
            }
        };
    }

    Ok(shape)
}

pub fn common_shape(shapes: &[&[usize]]) -> Result<Vec<usize>, BroadcastError> {
    shapes
        .iter()
        .try_fold(Vec::new(), |shape, next| broadcast_shape(&shape, next))
}

fn dim_from_right(shape: &[usize], offset: usize) -> usize {
    if offset < shape.len() {
        shape[shape.len() - 1 - offset]
    } else {
        1
    }
}

pub fn broadcast_to<'b>(
    array: &'b ArrayViewD<'_, f64>,
    shape: &[usize],
) -> Result<ArrayViewD<'b, f64>, BroadcastError> {
    array
        .broadcast(shape)
        .ok_or_else(|| BroadcastError::Incompatible {
            lhs: array.shape().to_vec(),
            rhs: shape.to_vec(),
        })
}

/// Append a unit axis, so `(N, ...)` atmosphere arrays line up with an energy
/// axis placed last.
pub fn with_trailing_axis<'a>(array: &ArrayViewD<'a, f64>) -> ArrayViewD<'a, f64> {
    let ndim = array.ndim();
    array.clone().insert_axis(Axis(ndim))
}

pub fn map2<F>(
    a: &ArrayViewD<'_, f64>,
    b: &ArrayViewD<'_, f64>,
    mut f: F,
) -> Result<ArrayD<f64>, BroadcastError>
where
    F: FnMut(f64, f64) -> f64,
{
    let shape = common_shape(&[a.shape(), b.shape()])?;
    let a = broadcast_to(a, &shape)?;
    let b = broadcast_to(b, &shape)?;
    Ok(Zip::from(&a).and(&b).map_collect(|&a, &b| f(a, b)))
}

/// Fallible element-wise map over any number of broadcast operands.
///
/// `f` receives the flat (row-major) index in the broadcast result together
/// with one sample per operand, in operand order.
pub fn try_map_indexed<T, F, E>(operands: &[ArrayViewD<'_, f64>], mut f: F) -> Result<ArrayD<T>, E>
where
    F: FnMut(usize, &[f64]) -> Result<T, E>,
    E: From<BroadcastError>,
{
    let shapes: Vec<&[usize]> = operands.iter().map(|operand| operand.shape()).collect();
    let shape = common_shape(&shapes)?;
    let views = operands
        .iter()
        .map(|operand| broadcast_to(operand, &shape))
        .collect::<Result<Vec<_>, _>>()?;
    let mut iterators: Vec<_> = views.iter().map(|view| view.iter()).collect();

    let len = shape.iter().product();
    let mut values = Vec::with_capacity(len);
    let mut sample = vec![0.0; operands.len()];
    for index in 0..len {
        for (value, iterator) in sample.iter_mut().zip(iterators.iter_mut()) {
            *value = iterator.next().copied().unwrap_or(f64::NAN);
        }
        values.push(f(index, &sample)?);
    }
    let len = values.len();
    ArrayD::from_shape_vec(IxDyn(&shape), values)
        .map_err(|_| BroadcastError::Layout { shape, len }.into())
}

#[cfg(test)]
mod tests {
    use super::{
        BroadcastError, broadcast_shape, common_shape, map2, try_map_indexed, with_trailing_axis,
    };
    use ndarray::{ArrayD, IxDyn, arr0};

    #[test]
    fn broadcast_shape_follows_right_aligned_rules() {
        assert_eq!(broadcast_shape(&[1, 4], &[3, 1]).expect("shape"), vec![3, 4]);
        assert_eq!(broadcast_shape(&[5], &[2, 3, 1]).expect("shape"), vec![2, 3, 5]);
        assert_eq!(broadcast_shape(&[], &[2]).expect("shape"), vec![2]);
        assert_eq!(
            common_shape(&[&[1, 1, 7], &[4, 1], &[3, 1, 1]]).expect("shape"),
            vec![3, 4, 7]
        );
    }

    #[test]
    fn broadcast_shape_rejects_mismatched_dimensions() {
        let error = broadcast_shape(&[2, 3], &[4]).expect_err("mismatch should fail");
        assert_eq!(
            error,
            BroadcastError::Incompatible {
                lhs: vec![2, 3],
                rhs: vec![4],
            }
        );
    }

    #[test]
    fn map2_produces_outer_grid_for_row_and_column() {
        let row = ArrayD::from_shape_vec(IxDyn(&[1, 3]), vec![1.0, 2.0, 3.0]).expect("row");
        let col = ArrayD::from_shape_vec(IxDyn(&[2, 1]), vec![10.0, 20.0]).expect("col");

        let sum = map2(&row.view(), &col.view(), |a, b| a + b).expect("map");
        assert_eq!(sum.shape(), &[2, 3]);
        assert_eq!(sum[[1, 2]], 23.0);
        assert_eq!(sum[[0, 0]], 11.0);
    }

    #[test]
    fn try_map_indexed_accepts_zero_dimensional_scalars() {
        let scalar = arr0(2.0).into_dyn();
        let vector = ArrayD::from_shape_vec(IxDyn(&[3]), vec![1.0, 2.0, 3.0]).expect("vector");

        let operands = [scalar.view(), vector.view(), scalar.view(), scalar.view()];
        let product = try_map_indexed(&operands, |_, sample| {
            Ok::<_, BroadcastError>(sample.iter().product::<f64>())
        })
        .expect("map");
        assert_eq!(product.shape(), &[3]);
        assert_eq!(product[[2]], 24.0);
    }

    #[derive(Debug, PartialEq)]
    enum SampleError {
        Negative { index: usize },
        Broadcast(BroadcastError),
    }

    impl From<BroadcastError> for SampleError {
        fn from(error: BroadcastError) -> Self {
            Self::Broadcast(error)
        }
    }

    #[test]
    fn try_map_indexed_reports_flat_index_of_failure() {
        let row = ArrayD::from_shape_vec(IxDyn(&[1, 3]), vec![1.0, -2.0, 3.0]).expect("row");
        let col = ArrayD::from_shape_vec(IxDyn(&[2, 1]), vec![1.0, 1.0]).expect("col");

        let error = try_map_indexed(&[row.view(), col.view()], |index, sample| {
            if sample[0] < 0.0 {
                Err(SampleError::Negative { index })
            } else {
                Ok(sample[0] * sample[1])
            }
        })
        .expect_err("negative sample");
        assert_eq!(error, SampleError::Negative { index: 1 });

        let product = try_map_indexed(&[row.view(), col.view()], |_, sample| {
            Ok::<_, SampleError>(sample[0].abs())
        })
        .expect("map");
        assert_eq!(product.shape(), &[2, 3]);
        assert_eq!(product[[1, 1]], 2.0);

        let mismatch = ArrayD::from_shape_vec(IxDyn(&[2]), vec![1.0, 2.0]).expect("mismatch");
        let error = try_map_indexed(&[row.view(), mismatch.view()], |_, _| {
            Ok::<f64, SampleError>(0.0)
        })
        .expect_err("shape mismatch");
        assert!(matches!(error, SampleError::Broadcast(_)));
    }

    #[test]
    fn trailing_axis_is_appended() {
        let column = ArrayD::from_shape_vec(IxDyn(&[3, 1]), vec![1.0, 2.0, 3.0]).expect("column");
        let view = column.view();
        assert_eq!(with_trailing_axis(&view).shape(), &[3, 1, 1]);
    }
}
