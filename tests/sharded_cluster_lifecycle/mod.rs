use ha_harness::Error;
use ha_harness::ReplicaSet;
use ha_harness::ShardedCluster;
use ha_harness::TopologyError;

use crate::common::simulated_harness;
use crate::common::states;

fn shard(
    name: &str,
    ctx: &ha_harness::HarnessContext,
) -> ReplicaSet {
    let mut rs = ReplicaSet::new_shard(name, ctx);
    rs.add_replica(&format!("{name}-a")).unwrap();
    rs.add_replica(&format!("{name}-b")).unwrap();
    rs.add_arbiter(&format!("{name}-arb")).unwrap();
    rs
}

#[tokio::test(start_paused = true)]
async fn two_shard_cluster_with_three_config_servers() {
    let temp_dir = tempfile::tempdir().unwrap();
    let h = simulated_harness(temp_dir.path());
    let mut cluster = ShardedCluster::new("cluster0", &h.ctx);
    cluster.add_shard(shard("sh0", &h.ctx)).unwrap();
    cluster.add_shard(shard("sh1", &h.ctx)).unwrap();
    for name in ["cfg0", "cfg1", "cfg2"] {
        cluster.add_config_server(name).unwrap();
    }

    cluster.start().await.unwrap();
    cluster.wait_for_healthy().await.unwrap();

    assert_eq!(h.supervisor.running_ports().len(), 9);
    let config_servers: Vec<_> = h.supervisor.launches().into_iter().filter(|s| s.has_flag("--configsvr")).collect();
    assert_eq!(config_servers.len(), 3);
    assert!(config_servers.iter().all(|s| !s.has_flag("--replSet")));
    assert!(config_servers.iter().all(|s| s.working_dir.starts_with(cluster.root())));

    for shard in cluster.shards() {
        let status = shard.status().await.unwrap();
        assert_eq!(states(&status), vec!["PRIMARY", "SECONDARY", "ARBITER"]);
    }
    assert_eq!(h.deployment.commands_named("replSetInitiate").len(), 2);

    cluster.shutdown().await.unwrap();
    assert!(h.supervisor.running_ports().is_empty());

    cluster.destroy().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn full_cluster_rejects_extra_shard_and_still_starts() {
    let temp_dir = tempfile::tempdir().unwrap();
    let h = simulated_harness(temp_dir.path());
    let mut cluster = ShardedCluster::new("cluster0", &h.ctx);

    for i in 0..cluster.capacity() {
        let mut rs = ReplicaSet::new_shard(&format!("sh{i}"), &h.ctx);
        rs.add_replica("a").unwrap();
        cluster.add_shard(rs).unwrap();
    }
    let mut extra = ReplicaSet::new_shard("sh-extra", &h.ctx);
    extra.add_replica("a").unwrap();

    assert!(matches!(
        cluster.add_shard(extra),
        Err(Error::Topology(TopologyError::ShardCapacityExceeded { capacity: 12 }))
    ));

    cluster.start().await.unwrap();
    cluster.wait_for_healthy().await.unwrap();
    assert_eq!(h.supervisor.running_ports().len(), 12);

    cluster.destroy().await.unwrap();
}
