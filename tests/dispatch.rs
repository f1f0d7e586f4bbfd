use std::any::Any;
use std::fmt;
use std::sync::{Arc, OnceLock};

use ndarray_dispatch::{
    broadcast_arrays, functions, Arguments, ArrayType, ArrayView, DispatchConfig, DispatchGate, DuckArray, Error,
    ErrorKind, Function, Outcome, Value,
};

/// A duck array that stands for an `n` x `n` matrix holding `value` on its
/// diagonal, and handles a fixed set of functions itself.
#[derive(Debug)]
struct DiagonalArray
{
    n: usize,
    value: f64,
}

impl DiagonalArray
{
    fn ty() -> &'static Arc<ArrayType>
    {
        static TYPE: OnceLock<Arc<ArrayType>> = OnceLock::new();
        TYPE.get_or_init(|| {
            ArrayType::builder("DiagonalArray")
                .array_function(diagonal_array_function)
                .build()
        })
    }
}

impl DuckArray for DiagonalArray
{
    fn array_type(&self) -> &Arc<ArrayType>
    {
        DiagonalArray::ty()
    }

    fn as_any(&self) -> &dyn Any
    {
        self
    }
}

fn diagonal_array_function(
    this: &Value, func: &Function, types: &[Arc<ArrayType>], _args: &Arguments,
) -> Result<Outcome, Error>
{
    let known = |ty: &Arc<ArrayType>| ty.is(DiagonalArray::ty()) || ty.is_array_type();
    if !types.iter().all(known) {
        return Ok(Outcome::Declined);
    }
    let diag = this
        .as_object()
        .and_then(|o| o.downcast_ref::<DiagonalArray>())
        .ok_or_else(|| Error::custom("hook called with a foreign object"))?;
    match func.name() {
        // report the broadcast shape as a list of lengths
        "broadcast_arrays" => Ok(Outcome::Claimed(Value::from(vec![
            Value::Int(diag.n as i64),
            Value::Int(diag.n as i64),
        ]))),
        "zeros_like" => Ok(Outcome::Claimed(Value::object(DiagonalArray { n: diag.n, value: 0. }))),
        "trace" => Ok(Outcome::Claimed(Value::Float(diag.n as f64 * diag.value))),
        _ => Ok(Outcome::Declined),
    }
}

fn declines(name: &'static str) -> Arc<ArrayType>
{
    ArrayType::builder(name)
        .array_function(|_, _, _, _| Ok(Outcome::Declined))
        .build()
}

#[derive(Debug)]
struct Plain(Arc<ArrayType>);

impl DuckArray for Plain
{
    fn array_type(&self) -> &Arc<ArrayType>
    {
        &self.0
    }

    fn as_any(&self) -> &dyn Any
    {
        self
    }
}

/// `test.trace(a)`: the default implementation sums the diagonal of a 2-d
/// array.
fn trace() -> &'static Function
{
    static FUNCTION: OnceLock<Function> = OnceLock::new();
    FUNCTION.get_or_init(|| {
        Function::new(
            "test",
            "trace",
            |args: &Arguments| args.args().to_vec(),
            |args: &Arguments| {
                let a = args
                    .get(0)
                    .and_then(Value::as_array)
                    .ok_or_else(|| Error::custom("trace needs an array"))?;
                let n = a.shape().iter().copied().min().unwrap_or(0);
                let sum = (0..n).filter_map(|i| a.get::<f64>(&[i, i])).sum::<f64>();
                Ok(Value::Float(sum))
            },
        )
    })
}

/// `test.zeros_like(shape, like=None)`
fn zeros_like() -> &'static Function
{
    static FUNCTION: OnceLock<Function> = OnceLock::new();
    FUNCTION.get_or_init(|| {
        Function::new(
            "test",
            "zeros_like",
            |_: &Arguments| Vec::new(),
            |args: &Arguments| {
                let shape = args
                    .get(0)
                    .and_then(Value::to_shape)
                    .ok_or_else(|| Error::custom("zeros_like needs a shape"))?;
                Ok(Value::from(ArrayView::zeros::<f64, _>(shape)))
            },
        )
    })
}

fn identity(n: usize) -> ArrayView
{
    let v = (0..n * n).map(|i| if i % (n + 1) == 0 { 1. } else { 0. }).collect();
    ArrayView::from_shape_vec((n, n), v).unwrap()
}

#[test]
fn without_candidates_default_runs()
{
    let gate = DispatchGate::default();
    let a = Value::from(ArrayView::from_shape_vec((1, 2), vec![1i32, 2]).unwrap());
    let b = Value::from(ArrayView::from_shape_vec((2, 1), vec![3i32, 4]).unwrap());
    let direct = broadcast_arrays(&[a.clone(), b.clone()], false).unwrap();
    let dispatched = gate
        .call(functions::broadcast_arrays(), Arguments::positional(vec![a, b]))
        .unwrap();
    let dispatched = dispatched.as_list().unwrap();
    assert_eq!(dispatched.len(), 2);
    for (d, x) in dispatched.iter().zip(&direct) {
        let d = d.as_array().unwrap();
        assert_eq!(d.shape(), x.shape());
        assert_eq!(d.strides(), x.strides());
        assert_eq!(d.to_vec::<i32>(), x.to_vec::<i32>());
    }

    // no array-like argument at all
    let r = gate.call(trace(), Arguments::new().arg(Value::Int(1)));
    assert_eq!(r.unwrap_err().kind(), ErrorKind::Implementation);
    let r = gate.call(trace(), Arguments::new().arg(identity(3)));
    assert_eq!(r, Ok(Value::Float(3.)));
}

#[test]
fn override_claims()
{
    let gate = DispatchGate::default();
    let diag = Value::object(DiagonalArray { n: 4, value: 2.5 });
    assert_eq!(gate.call(trace(), Arguments::new().arg(diag.clone())), Ok(Value::Float(10.)));

    // mixed with plain arrays: the default hook declines, the duck claims
    let args = Arguments::positional(vec![Value::from(identity(4)), diag]);
    let r = gate.call(functions::broadcast_arrays(), args).unwrap();
    assert_eq!(r.as_list().map(|l| l.len()), Some(2));
    assert_eq!(r, Value::from(vec![Value::Int(4), Value::Int(4)]));
}

#[test]
fn sole_candidate_declines()
{
    let gate = DispatchGate::default();
    let shy = declines("Shy");
    let e = gate
        .call(trace(), Arguments::new().arg(Value::object(Plain(shy))))
        .unwrap_err();
    assert_eq!(e.kind(), ErrorKind::NoImplementationFound);
    assert_eq!(e.function_name(), Some("test.trace"));
    assert_eq!(
        e.to_string(),
        "no implementation found for 'test.trace' on types that implement array_function: [Shy]"
    );

    // the diagonal array does not handle every function
    let diag = Value::object(DiagonalArray { n: 2, value: 1. });
    let e = gate
        .call(functions::rolling_window(), Arguments::new().arg(diag).arg(1i64))
        .unwrap_err();
    assert_eq!(e.function_name(), Some("ndarray.rolling_window"));
}

#[test]
fn unknown_types_make_everyone_decline()
{
    let gate = DispatchGate::default();
    let shy = declines("Shy");
    let args = Arguments::positional(vec![Value::from(identity(2)), Value::object(Plain(shy))]);
    let e = gate.call(trace(), args).unwrap_err();
    assert_eq!(
        e.to_string(),
        "no implementation found for 'test.trace' on types that implement array_function: [ndarray, Shy]"
    );
}

#[test]
fn declining_subclass_falls_back_to_default_hook()
{
    let gate = DispatchGate::default();
    let sub = ArrayType::builder("ShySub")
        .supertype(ArrayType::base())
        .array_function(|_, _, _, _| Ok(Outcome::Declined))
        .build();
    let base = identity(2);
    let a = base.view_as(&sub);

    // the base array's default hook accepts, since both types are arrays
    let args = Arguments::positional(vec![base, a.clone()]);
    assert_eq!(gate.call(trace(), args), Ok(Value::Float(2.)));

    // alone, nobody is left to run the default
    let e = gate.call(trace(), Arguments::new().arg(a)).unwrap_err();
    assert_eq!(e.kind(), ErrorKind::NoImplementationFound);
}

#[test]
fn subclass_forwards_to_default()
{
    let wrapping = ArrayType::subclass("Wrapping")
        .array_function(|_, func, _, args| {
            let result = func.implementation(args)?;
            Ok(Outcome::Claimed(Value::List(vec![Value::from("wrapped"), result])))
        })
        .build();
    let gate = DispatchGate::default();
    let a = identity(3).view_as(&wrapping);
    let r = gate.call(trace(), Arguments::new().arg(a)).unwrap();
    assert_eq!(r, Value::List(vec![Value::from("wrapped"), Value::Float(3.)]));
}

#[derive(Debug)]
struct Refused;

impl fmt::Display for Refused
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str("refused")
    }
}

impl std::error::Error for Refused {}

#[test]
fn hook_errors_propagate()
{
    let calls = Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let seen = calls.clone();
    let failing = ArrayType::builder("Failing")
        .array_function(|_, _, _, _| Err(Error::custom(Refused)))
        .build();
    let counting = ArrayType::builder("Counting")
        .array_function(move |_, _, _, _| {
            seen.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(Outcome::Declined)
        })
        .build();

    let gate = DispatchGate::default();
    let args = Arguments::positional(vec![Value::object(Plain(failing)), Value::object(Plain(counting))]);
    let e = gate.call(trace(), args).unwrap_err();
    assert_eq!(e.kind(), ErrorKind::Implementation);
    assert_eq!(e.to_string(), "refused");
    let source = std::error::Error::source(&e).unwrap();
    assert!(source.downcast_ref::<Refused>().is_some());
    // the later candidate was never asked
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
}

#[test]
fn hooks_see_types_and_representative()
{
    let a = declines("A");
    let sub = ArrayType::builder("SubA")
        .supertype(&a)
        .array_function(|this, _, types, args| {
            let names = types.iter().map(|t| Value::from(t.name())).collect::<Vec<_>>();
            let is_first = args.get(2) == Some(this);
            Ok(Outcome::Claimed(Value::List(vec![Value::List(names), Value::Bool(is_first)])))
        })
        .build();
    let gate = DispatchGate::default();
    let args = Arguments::positional(vec![
        Value::object(Plain(a.clone())),
        Value::Int(0),
        Value::object(Plain(sub.clone())),
        Value::object(Plain(sub)),
    ]);
    let r = gate.call(trace(), args).unwrap();
    assert_eq!(
        r,
        Value::List(vec![
            Value::List(vec![Value::from("SubA"), Value::from("A")]),
            Value::Bool(true)
        ])
    );
}

#[test]
fn disabled_protocol_runs_default()
{
    let gate = DispatchGate::new(DispatchConfig::disabled());
    let diag = Value::object(DiagonalArray { n: 4, value: 2.5 });
    let e = gate.call(trace(), Arguments::new().arg(diag.clone())).unwrap_err();
    assert_eq!(e.kind(), ErrorKind::Implementation);
    assert_eq!(e.to_string(), "trace needs an array");

    let r = gate.call_like(zeros_like(), Some(&diag), Arguments::new().arg(2i64)).unwrap();
    assert_eq!(r.as_array().map(|a| a.shape().to_vec()), Some(vec![2]));
}

#[test]
fn like_dispatches_creation()
{
    let gate = DispatchGate::default();
    let diag = Value::object(DiagonalArray { n: 3, value: 1. });
    let args = Arguments::new().arg(vec![Value::Int(3), Value::Int(3)]);

    let made = gate.call_like(zeros_like(), Some(&diag), args.clone()).unwrap();
    let made = made.as_object().and_then(|o| o.downcast_ref::<DiagonalArray>()).unwrap();
    assert_eq!((made.n, made.value), (3, 0.));

    let plain = gate.call_like(zeros_like(), None, args.clone()).unwrap();
    assert_eq!(plain.as_array().unwrap().shape(), &[3, 3]);

    let like_array = Value::from(identity(1));
    let plain = gate.call_like(zeros_like(), Some(&like_array), args).unwrap();
    assert!(plain.as_array().is_some());

    // without `like` the relevant arguments are empty, so nothing is dispatched
    let r = gate.call(zeros_like(), Arguments::new().arg(2i64)).unwrap();
    assert!(r.as_array().is_some());
}

#[test]
fn unexpected_keywords()
{
    let gate = DispatchGate::default();
    let a = ArrayView::from_vec(vec![1u8]);
    let e = gate
        .call(functions::broadcast_arrays(), Arguments::new().arg(a).kwarg("subokk", true))
        .unwrap_err();
    assert_eq!(e.kind(), ErrorKind::InvalidArgument);
    assert_eq!(e.to_string(), "broadcast_arrays() got an unexpected keyword argument 'subokk'");
}

#[test]
fn shared_between_threads()
{
    let gate = DispatchGate::default();
    std::thread::scope(|s| {
        for n in 1..5 {
            let gate = &gate;
            s.spawn(move || {
                let diag = Value::object(DiagonalArray { n, value: 1. });
                assert_eq!(gate.call(trace(), Arguments::new().arg(diag)), Ok(Value::Float(n as f64)));
                let id = Value::from(identity(n));
                assert_eq!(gate.call(trace(), Arguments::new().arg(id)), Ok(Value::Float(n as f64)));
            });
        }
    });
}
