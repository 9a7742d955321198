mod algorithms;
mod routing_table;
mod topology;
mod viz_meta;

use crate::net::Topology;

/// 按名称建一条链：names[0] - names[1] - ...
pub(crate) fn line_of(names: &[&str]) -> Topology {
    let mut topo = Topology::new();
    for name in names {
        assert!(topo.add_router(*name).unwrap());
    }
    for pair in names.windows(2) {
        assert!(topo.add_edge(pair[0], pair[1]).unwrap());
    }
    topo
}
