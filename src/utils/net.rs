use std::net::IpAddr;
use std::net::SocketAddr;

/// "127.0.0.1:27017" style host string used in replica-set member documents
pub fn host_string(
    ip: IpAddr,
    port: u16,
) -> String {
    SocketAddr::new(ip, port).to_string()
}

/// Discovery string enumerating every member plus the replica-set name:
/// `mongodb://127.0.0.1:30001,127.0.0.1:30002/?replicaSet=rs0`
pub fn connection_string<I>(
    hosts: I,
    replica_set: &str,
) -> String
where
    I: IntoIterator<Item = SocketAddr>,
{
    let seeds = hosts.into_iter().map(|addr| addr.to_string()).collect::<Vec<_>>().join(",");
    format!("mongodb://{seeds}/?replicaSet={replica_set}")
}
