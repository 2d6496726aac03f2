//! Integration test: frame sinks see the right views at the right time.

use tessel_core::{IterationId, PartitionId};
use tessel_engine::{ClusterConfig, ClusterError, FrameStage, LockstepCluster, ThreadedCluster};
use tessel_test_utils::{heavy_config, CollectingSink};

#[test]
fn lockstep_delivers_initial_and_final_frames() {
    let config = ClusterConfig::new(heavy_config(3), 4);
    let mut c = LockstepCluster::new(&config).unwrap();
    let mut sink = CollectingSink::new();
    c.run(&mut sink).unwrap();

    assert_eq!(sink.frames.len(), 8);
    let initial = sink.at(FrameStage::Initial);
    assert_eq!(initial.len(), 4);
    assert_eq!(initial[&PartitionId(3)].row, 1);
    assert_eq!(initial[&PartitionId(3)].col, 1);
    assert_eq!(sink.particles_at(FrameStage::Initial), 4 * 13);
    assert_eq!(sink.particles_at(FrameStage::Final), c.total_particles());
}

#[test]
fn step_frames_only_when_requested() {
    let config = ClusterConfig::new(heavy_config(3), 4);
    let mut c = LockstepCluster::new(&config).unwrap();
    let mut sink = CollectingSink::with_steps();
    c.run(&mut sink).unwrap();
    assert_eq!(sink.frames.len(), 4 * (2 + 3));
    assert_eq!(sink.at(FrameStage::Step(IterationId(2))).len(), 4);
    assert!(sink.at(FrameStage::Step(IterationId(3))).is_empty());
}

#[test]
fn threaded_delivers_initial_and_final_frames() {
    let config = ClusterConfig::new(heavy_config(2), 9);
    let mut sink = CollectingSink::with_steps();
    let done = ThreadedCluster::new(&config).unwrap().run(&mut sink).unwrap();
    assert_eq!(sink.frames.len(), 18);
    assert_eq!(sink.particles_at(FrameStage::Final), done.total_particles());
}

#[test]
fn sink_failure_stops_the_run() {
    let config = ClusterConfig::new(heavy_config(3), 4);
    let mut c = LockstepCluster::new(&config).unwrap();
    let mut sink = CollectingSink {
        fail_at: Some(2),
        ..CollectingSink::default()
    };
    match c.run(&mut sink) {
        Err(ClusterError::Sink { partition, .. }) => assert_eq!(partition, PartitionId(2)),
        other => panic!("expected Sink error, got {other:?}"),
    }
    assert_eq!(c.iteration(), IterationId(0));
}
