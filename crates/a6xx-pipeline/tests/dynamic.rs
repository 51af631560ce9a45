mod common;

use a6xx_pipeline::state::multisample;
use a6xx_pipeline::{
    DynamicState, DynamicStateMask, DynamicStateValue, MultisampleState, PipelineError, Rect2D, SampleLocation,
    SampleLocationsInfo, SampleLocationsState, Extent2D, Viewport,
};
use a6xx_protocol::decode::RegisterWrites;
use a6xx_protocol::regs::{GrasSuCntl, GRAS_SAMPLE_CONFIG, GRAS_SU_CNTL, RB_SAMPLE_CONFIG};
use a6xx_protocol::CsWriter;
use common::*;
use pretty_assertions::assert_eq;

#[test]
fn dynamic_viewport_and_scissor_are_not_baked() {
    let (device, _, _) = device();
    let mut ci = basic_create_info();
    ci.viewport = None;
    ci.dynamic_states = vec![DynamicState::Scissor, DynamicState::Viewport];
    let p = device.create_graphics_pipeline(&ci).unwrap();

    assert_eq!(p.dynamic_state_mask(), DynamicStateMask::VIEWPORT | DynamicStateMask::SCISSOR);
    assert!(p.static_state(DynamicState::Viewport).is_empty());
    assert!(p.static_state(DynamicState::Scissor).is_empty());
    assert!(!p.static_state(DynamicState::LineWidth).is_empty());

    let mut cs = CsWriter::unbounded();
    let vp = Viewport {
        width: 32.0,
        height: 32.0,
        max_depth: 1.0,
        ..Default::default()
    };
    p.emit_dynamic_state(&mut cs, &DynamicStateValue::Viewport(vp)).unwrap();
    p.emit_dynamic_state(&mut cs, &DynamicStateValue::Scissor(Rect2D::default()))
        .unwrap();
    assert_eq!(
        cs.len() as u32,
        DynamicState::Viewport.static_size() + DynamicState::Scissor.static_size()
    );

    let err = p
        .emit_dynamic_state(&mut cs, &DynamicStateValue::LineWidth(2.0))
        .unwrap_err();
    assert!(matches!(err, PipelineError::InvalidDescription(_)));
}

#[test]
fn baked_line_width_is_folded_into_su_cntl() {
    let (device, _, _) = device();
    let mut ci = basic_create_info();
    ci.rasterization.line_width = 3.0;
    let p = device.create_graphics_pipeline(&ci).unwrap();

    let su = p.gras_su_cntl();
    assert_eq!(su & GrasSuCntl::LINEHALFWIDTH_MASK, GrasSuCntl::linehalfwidth(1.5));
    let regs = RegisterWrites::decode(p.words(p.static_state(DynamicState::LineWidth))).unwrap();
    assert_eq!(regs.get(GRAS_SU_CNTL), Some(su));
}

#[test]
fn dynamic_line_width_keeps_the_pipeline_su_bits() {
    let (device, _, _) = device();
    let mut ci = basic_create_info();
    ci.dynamic_states = vec![DynamicState::LineWidth];
    ci.rasterization.cull_mode = a6xx_pipeline::CullMode::BACK;
    let p = device.create_graphics_pipeline(&ci).unwrap();

    assert!(p.static_state(DynamicState::LineWidth).is_empty());
    assert_eq!(p.gras_su_cntl() & GrasSuCntl::LINEHALFWIDTH_MASK, 0);

    let mut cs = CsWriter::unbounded();
    p.emit_dynamic_state(&mut cs, &DynamicStateValue::LineWidth(4.0)).unwrap();
    let regs = RegisterWrites::decode(cs.words()).unwrap();
    assert_eq!(
        regs.get(GRAS_SU_CNTL),
        Some(p.gras_su_cntl() | GrasSuCntl::linehalfwidth(2.0))
    );
}

#[test]
fn custom_sample_locations_take_the_longer_block() {
    let (device, compiler, _) = device();
    let mut ci = basic_create_info();
    ci.multisample = Some(MultisampleState {
        rasterization_samples: 1,
        sample_locations: Some(SampleLocationsState {
            enable: true,
            info: SampleLocationsInfo {
                per_pixel: 1,
                grid_size: Extent2D { width: 1, height: 1 },
                locations: vec![SampleLocation { x: 0.5, y: 0.5 }],
            },
        }),
        ..Default::default()
    });
    let p = device.create_graphics_pipeline(&ci).unwrap();

    let block = p.static_state(DynamicState::SampleLocations);
    assert_eq!(block.size, multisample::sample_locations_dwords(true));
    let regs = RegisterWrites::decode(p.words(block)).unwrap();
    assert_ne!(regs.get(GRAS_SAMPLE_CONFIG), Some(0));
    // Custom positions change interpolation even single-sampled.
    assert!(compiler.calls().iter().all(|c| c.key.msaa));
}

#[test]
fn default_sample_locations_can_be_restored_dynamically() {
    let (device, _, _) = device();
    let mut ci = basic_create_info();
    ci.dynamic_states = vec![DynamicState::SampleLocations];
    let p = device.create_graphics_pipeline(&ci).unwrap();
    assert!(p.static_state(DynamicState::SampleLocations).is_empty());

    let mut cs = CsWriter::unbounded();
    p.emit_dynamic_state(&mut cs, &DynamicStateValue::SampleLocations(None))
        .unwrap();
    let regs = RegisterWrites::decode(cs.words()).unwrap();
    assert_eq!(regs.get(RB_SAMPLE_CONFIG), Some(0));
}

#[test]
fn raw_dynamic_state_values_fold_into_the_mask() {
    let states: Vec<DynamicState> = [0, 1, DynamicState::SAMPLE_LOCATIONS_RAW]
        .into_iter()
        .map(|raw| DynamicState::from_raw(raw).unwrap())
        .collect();
    assert_eq!(
        DynamicStateMask::from_states(&states),
        DynamicStateMask::VIEWPORT | DynamicStateMask::SCISSOR | DynamicStateMask::SAMPLE_LOCATIONS
    );
    assert!(DynamicState::from_raw(42).is_err());
}
