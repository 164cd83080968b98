use super::*;
use crate::backend::cpu::CpuBackend;
use crate::node::parameter::Parameter;
use crate::node::port::PortSet;
use crate::node::value::PortType;

fn fixture() -> (NodeId, InputValues, ParameterSet, PortSet) {
    let id = NodeId::new("ctx").unwrap();
    let mut inputs = InputValues::default();
    inputs.values.insert("image".to_string(), None);
    inputs
        .values
        .insert("amount".to_string(), Some(Value::Float(0.5)));
    let mut params = ParameterSet::default();
    params.add(Parameter::int("levels", 4));
    params.add(Parameter::choice("mode", "RGB", &["RGB", "HSV"]));
    let mut ports = PortSet::default();
    ports.add_output("image", PortType::Image, "");
    ports.add_output("anything", PortType::Any, "");
    (id, inputs, params, ports)
}

#[test]
fn inputs_resolve_by_declared_name_only() {
    let (id, inputs, params, ports) = fixture();
    let mut backend = CpuBackend::default();
    let ctx = ProcessContext::new(&id, &inputs, &params, ports.outputs(), &mut backend);

    assert_eq!(ctx.input("amount").unwrap(), Some(&Value::Float(0.5)));
    assert_eq!(ctx.input("image").unwrap(), None);
    assert!(matches!(
        ctx.input("mask"),
        Err(ArtificeError::PortNotFound { .. })
    ));
    let err = ctx.require_image("image").unwrap_err();
    assert_eq!(err.to_string(), "processing failure: No input image");
}

#[test]
fn typed_parameter_accessors() {
    let (id, inputs, params, ports) = fixture();
    let mut backend = CpuBackend::default();
    let ctx = ProcessContext::new(&id, &inputs, &params, ports.outputs(), &mut backend);

    assert_eq!(ctx.param_i64("levels").unwrap(), 4);
    assert_eq!(ctx.param_f64("levels").unwrap(), 4.0);
    assert_eq!(ctx.param_str("mode").unwrap(), "RGB");
    assert!(ctx.param_bool("levels").is_err());
    assert!(matches!(
        ctx.param("gamma"),
        Err(ArtificeError::ParameterNotFound { .. })
    ));
    assert_eq!(ctx.backend_name(), "cpu");
}

#[test]
fn outputs_are_staged_with_type_checks() {
    let (id, inputs, params, ports) = fixture();
    let mut backend = CpuBackend::default();
    let mut ctx = ProcessContext::new(&id, &inputs, &params, ports.outputs(), &mut backend);

    assert!(matches!(
        ctx.set_output("image", 1.0),
        Err(ArtificeError::TypeMismatch(_))
    ));
    assert!(matches!(
        ctx.set_output("mask", 1.0),
        Err(ArtificeError::PortNotFound { .. })
    ));
    ctx.set_output("anything", "text").unwrap();
    let img = ImageBuffer::filled(1, 1, 3, 0.0).unwrap();
    ctx.set_output("image", img.clone()).unwrap();

    let staged = ctx.into_staged();
    assert_eq!(staged.len(), 2);
    assert_eq!(staged["image"], Value::Image(img));
}
