use defmac::defmac;
use dispatch_gen::ArrayBuilder;
use itertools::Itertools;
use ndarray_dispatch::{broadcast_arrays, broadcast_shape, ArrayType, ArrayView, ErrorKind, Ix, Value};
use quickcheck::quickcheck;

fn list<I: IntoIterator<Item = Value>>(items: I) -> Value
{
    Value::List(items.into_iter().collect())
}

fn ints(v: &[i64]) -> Value
{
    list(v.iter().map(|&x| Value::Int(x)))
}

#[test]
fn row_against_column()
{
    let row = list(vec![ints(&[1, 2, 3])]);
    let col = list(vec![ints(&[1]), ints(&[2]), ints(&[3])]);
    let out = broadcast_arrays(&[row, col], false).unwrap();
    assert_eq!(out.len(), 2);
    assert_eq!(out[0].shape(), &[3, 3]);
    assert_eq!(out[1].shape(), &[3, 3]);
    assert_eq!(out[0].to_vec::<i64>().unwrap(), vec![1, 2, 3, 1, 2, 3, 1, 2, 3]);
    assert_eq!(out[1].to_vec::<i64>().unwrap(), vec![1, 1, 1, 2, 2, 2, 3, 3, 3]);
    assert_eq!(out[0].strides(), &[0, 8]);
    assert_eq!(out[1].strides(), &[8, 0]);
}

#[test]
fn mismatch_names_axis()
{
    let a = ArrayBuilder::new((3, 4)).build::<f64>();
    let b = ArrayBuilder::new((3, 5)).build::<f64>();
    let e = broadcast_arrays(&[Value::from(a), Value::from(b)], false).unwrap_err();
    assert_eq!(e.kind(), ErrorKind::ShapeMismatch);
    assert_eq!(e.axis(), Some(1));
    assert_eq!(
        e.to_string(),
        "shape mismatch: two or more arrays have incompatible dimensions on axis 1"
    );
}

#[test]
fn same_shapes_pass_through()
{
    let a = ArrayBuilder::new((2, 3)).build::<i32>();
    let b = ArrayBuilder::new((2, 3)).build::<i32>();
    let out = broadcast_arrays(&[Value::from(a.clone()), Value::from(b.clone())], false).unwrap();
    assert!(out[0].same_view(&a));
    assert!(out[1].same_view(&b));
    assert_eq!(out[0].owns_data(), a.owns_data());
}

#[test]
fn no_operands()
{
    assert!(broadcast_arrays(&[], false).unwrap().is_empty());
}

#[test]
fn scalars_stretch_everywhere()
{
    let a = ArrayBuilder::new((2, 2)).build::<f64>();
    let out = broadcast_arrays(&[Value::Float(0.5), Value::from(a)], false).unwrap();
    assert_eq!(out[0].shape(), &[2, 2]);
    assert_eq!(out[0].strides(), &[0, 0]);
    assert_eq!(out[0].to_vec::<f64>().unwrap(), vec![0.5; 4]);
}

#[test]
fn zero_length_axes()
{
    defmac!(shape a, b => broadcast_shape(&[a.to_vec(), b.to_vec()]));
    assert_eq!(shape!([0usize], [1usize]), Ok(vec![0]));
    assert_eq!(shape!([2usize, 0], [1usize]), Ok(vec![2, 0]));
    assert_eq!(shape!([0usize], [0usize]), Ok(vec![0]));
    assert_eq!(shape!([0usize], [2usize]).unwrap_err().axis(), Some(0));

    let empty = ArrayBuilder::new((3, 0)).build::<u8>();
    let out = broadcast_arrays(&[Value::from(empty), Value::Int(1)], false).unwrap();
    assert_eq!(out[1].shape(), &[3, 0]);
    assert!(out[1].is_empty());
}

#[test]
fn non_arrays_fail_coercion()
{
    let a = ArrayBuilder::new(2).build::<f64>();
    let e = broadcast_arrays(&[Value::from(a), Value::from("text")], false).unwrap_err();
    assert_eq!(e.kind(), ErrorKind::TypeCoercion);
}

#[test]
fn subok_runs_finalize()
{
    let tagged = ArrayType::subclass("Tagged")
        .finalize(|array: &mut ArrayView, source: &ArrayView| {
            if let Some(unit) = source.attr("unit") {
                array.set_attr("unit", unit.clone());
            }
        })
        .build();
    let mut a = ArrayBuilder::new((1, 3)).class(&tagged).build::<f64>();
    a.set_attr("unit", "m");
    let b = ArrayBuilder::new((2, 1)).build::<f64>();
    let operands = [Value::from(a), Value::from(b)];

    let kept = broadcast_arrays(&operands, true).unwrap();
    assert!(kept[0].class().is(&tagged));
    assert_eq!(kept[0].attr("unit"), Some(&Value::from("m")));
    assert!(kept[1].class().is(ArrayType::base()));

    let plain = broadcast_arrays(&operands, false).unwrap();
    assert!(plain[0].class().is(ArrayType::base()));
    assert!(plain[0].attr("unit").is_none());
}

/// Shapes of length at most four with axis lengths in `0..4`; each flag
/// chooses whether an operand has length 1 on that axis.
fn compatible_shapes(axes: &[(u8, bool, bool)], drop: u8) -> (Vec<Ix>, Vec<Ix>)
{
    let axes = &axes[..axes.len().min(4)];
    let a = axes
        .iter()
        .map(|&(len, one, _)| if one { 1 } else { len as usize % 4 })
        .collect::<Vec<_>>();
    let b = axes
        .iter()
        .map(|&(len, _, one)| if one { 1 } else { len as usize % 4 })
        .collect::<Vec<_>>();
    let drop = (drop as usize).min(b.len());
    (a, b[drop..].to_vec())
}

quickcheck! {
    fn compatible_shapes_broadcast(axes: Vec<(u8, bool, bool)>, drop: u8) -> bool {
        let (sa, sb) = compatible_shapes(&axes, drop);
        let a = ArrayBuilder::new(sa.clone()).build::<i64>();
        let b = ArrayBuilder::new(sb.clone()).build::<i64>();
        let out = match broadcast_arrays(&[Value::from(a.clone()), Value::from(b.clone())], false) {
            Ok(out) => out,
            Err(_) => return false,
        };
        let shape = out[0].shape().to_vec();
        if out[1].shape() != &shape[..] || shape.len() != sa.len() {
            return false;
        }
        let pad = shape.len() - sb.len();
        let axis_ok = shape.iter().enumerate().all(|(i, &len)| {
            let lb = if i < pad { 1 } else { sb[i - pad] };
            (len == sa[i] || sa[i] == 1) && (len == lb || lb == 1)
        });
        // every position reads the element its source index maps to
        let reads_ok = out[0].indices().all(|index| {
            let ia = index.iter().zip(&sa).map(|(&i, &len)| if len == 1 { 0 } else { i }).collect_vec();
            let ib = index[pad..].iter().zip(&sb).map(|(&i, &len)| if len == 1 { 0 } else { i }).collect_vec();
            out[0].get::<i64>(&index) == a.get::<i64>(&ia) && out[1].get::<i64>(&index) == b.get::<i64>(&ib)
        });
        axis_ok && reads_ok && out.iter().all(|v| v.shares_buffer(&a) || v.shares_buffer(&b))
    }

    fn distinct_lengths_mismatch(x: u8, y: u8, lead: u8) -> bool {
        let (x, y) = (x as usize % 5 + 2, y as usize % 5 + 2);
        if x == y {
            return true;
        }
        let lead = lead as usize % 3;
        let mut sa = vec![1; lead];
        sa.push(x);
        match broadcast_shape(&[sa, vec![y]]) {
            Err(e) => e.kind() == ErrorKind::ShapeMismatch && e.axis() == Some(lead),
            Ok(_) => false,
        }
    }
}
