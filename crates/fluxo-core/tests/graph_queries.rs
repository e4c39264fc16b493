//! Structural queries, subgraphs, and the adjacency export conventions.

use std::sync::Arc;

use fluxo_core::{
    AdjFormat, Bipartite, EdgeOrder, GraphError, Heterograph, IdArray, MetaGraph,
};

/// 3x4 bipartite: edges (0,1), (0,2), (1,0), (2,3) with eids 0..4.
fn sample_graph() -> Bipartite {
    Bipartite::from_coo(
        3,
        4,
        IdArray::from_vec(vec![0, 0, 1, 2]),
        IdArray::from_vec(vec![1, 2, 0, 3]),
    )
    .unwrap()
}

#[test]
fn coo_roundtrip_queries() {
    let g = sample_graph();
    assert_eq!(g.num_edges(), 4);
    assert_eq!(g.edge_id(2, 3).unwrap().as_slice(), &[3]);
    assert_eq!(g.successors(0).unwrap().as_slice(), &[1, 2]);
    assert_eq!(g.predecessors(0).unwrap().as_slice(), &[1]);
    let adj = g.get_adj(false, AdjFormat::Coo).unwrap();
    assert_eq!(adj.len(), 1);
    assert_eq!(adj[0].as_slice(), &[0, 0, 1, 2, 1, 2, 0, 3]);
}

#[test]
fn get_adj_csr_transpose_flag_is_inverted() {
    let g = sample_graph();
    // transpose=false serves the in-CSR (rows are destinations)
    let in_adj = g.get_adj(false, AdjFormat::Csr).unwrap();
    assert_eq!(in_adj[0].as_slice(), &[0, 1, 2, 3, 4]);
    assert_eq!(in_adj[1].as_slice(), &[1, 0, 0, 2]);
    assert_eq!(in_adj[2].as_slice(), &[2, 0, 1, 3]);
    // transpose=true serves the out-CSR
    let out_adj = g.get_adj(true, AdjFormat::Csr).unwrap();
    assert_eq!(out_adj[0].as_slice(), &[0, 2, 3, 4]);
    assert_eq!(out_adj[1].as_slice(), &[1, 2, 0, 3]);
    assert_eq!(out_adj[2].as_slice(), &[0, 1, 2, 3]);
    // transposed COO is the swapped stacking
    let coo_t = g.get_adj(true, AdjFormat::Coo).unwrap();
    assert_eq!(coo_t[0].as_slice(), &[1, 2, 0, 3, 0, 0, 1, 2]);
}

#[test]
fn csr_construction_matches_coo_construction() {
    let from_coo = sample_graph();
    let from_csr = Bipartite::from_csr(
        3,
        4,
        IdArray::from_vec(vec![0, 2, 3, 4]),
        IdArray::from_vec(vec![1, 2, 0, 3]),
        IdArray::from_vec(vec![0, 1, 2, 3]),
    )
    .unwrap();
    let a = from_coo.edges(EdgeOrder::Eid).unwrap();
    let b = from_csr.edges(EdgeOrder::Eid).unwrap();
    assert_eq!(a.src, b.src);
    assert_eq!(a.dst, b.dst);
    assert_eq!(a.eid, b.eid);
    assert_eq!(from_csr.in_csr(), from_coo.in_csr());
}

#[test]
fn edge_enumeration_orders() {
    let g = sample_graph();
    let by_eid = g.edges(EdgeOrder::Eid).unwrap();
    assert_eq!(by_eid.src.as_slice(), &[0, 0, 1, 2]);
    assert_eq!(by_eid.dst.as_slice(), &[1, 2, 0, 3]);
    assert_eq!(by_eid.eid.as_slice(), &[0, 1, 2, 3]);
    let by_src = g.edges(EdgeOrder::SrcDst).unwrap();
    assert!(by_src.src.as_slice().windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(by_src.eid.len(), 4);
}

#[test]
fn edges_any_swaps_an_in_csr_answer() {
    let g = sample_graph();
    g.in_csr();
    let any = g.edges(EdgeOrder::Any).unwrap();
    // served from the in-CSR: grouped by destination, endpoints swapped back
    assert_eq!(any.src.as_slice(), &[1, 0, 0, 2]);
    assert_eq!(any.dst.as_slice(), &[0, 1, 2, 3]);
    assert_eq!(any.eid.as_slice(), &[2, 0, 1, 3]);
}

#[test]
fn traversal_and_degrees() {
    let g = sample_graph();
    assert_eq!(g.out_degree(0).unwrap(), 2);
    assert_eq!(g.in_degree(3).unwrap(), 1);
    assert_eq!(
        g.out_degrees(&IdArray::from_vec(vec![0, 1, 2])).unwrap().as_slice(),
        &[2, 1, 1]
    );
    assert_eq!(
        g.in_degrees(&IdArray::from_vec(vec![0, 1, 2, 3])).unwrap().as_slice(),
        &[1, 1, 1, 1]
    );

    let in_edges = g.in_edges(0).unwrap();
    assert_eq!(in_edges.src.as_slice(), &[1]);
    assert_eq!(in_edges.dst.as_slice(), &[0]);
    assert_eq!(in_edges.eid.as_slice(), &[2]);

    let out_edges = g.out_edges_many(&IdArray::from_vec(vec![0, 1])).unwrap();
    assert_eq!(out_edges.src.as_slice(), &[0, 0, 1]);
    assert_eq!(out_edges.dst.as_slice(), &[1, 2, 0]);
    assert_eq!(out_edges.eid.as_slice(), &[0, 1, 2]);
}

#[test]
fn edge_existence_checks() {
    let g = sample_graph();
    assert!(g.has_edge_between(0, 2).unwrap());
    assert!(!g.has_edge_between(1, 3).unwrap());
    assert_eq!(
        g.has_edges_between(
            &IdArray::from_vec(vec![0, 2, 1]),
            &IdArray::from_vec(vec![1, 3, 3])
        )
        .unwrap(),
        vec![true, true, false]
    );
    assert_eq!(g.has_vertices(0, &IdArray::from_vec(vec![0, 2, 3])).unwrap(),
        vec![true, true, false]);

    let matches = g
        .edge_ids(&IdArray::from_vec(vec![0]), &IdArray::from_vec(vec![2]))
        .unwrap();
    assert_eq!(matches.src.as_slice(), &[0]);
    assert_eq!(matches.dst.as_slice(), &[2]);
    assert_eq!(matches.eid.as_slice(), &[1]);
}

#[test]
fn find_edges_requires_valid_ids() {
    let g = sample_graph();
    assert_eq!(g.find_edge(2).unwrap(), (1, 0));
    let found = g.find_edges(&IdArray::from_vec(vec![1, 2])).unwrap();
    assert_eq!(found.src.as_slice(), &[0, 1]);
    assert_eq!(found.dst.as_slice(), &[2, 0]);
    assert_eq!(found.eid.as_slice(), &[1, 2]);
    assert_eq!(g.find_edge(10), Err(GraphError::NoSuchEdge(10)));
    assert!(matches!(
        g.edge_id(5, 0),
        Err(GraphError::NoSuchVertex { vtype: 0, id: 5 })
    ));
}

#[test]
fn parallel_edges_are_all_reported() {
    let g = Bipartite::from_coo(
        2,
        2,
        IdArray::from_vec(vec![0, 0, 1]),
        IdArray::from_vec(vec![1, 1, 0]),
    )
    .unwrap();
    assert!(g.is_multigraph());
    assert_eq!(g.edge_id(0, 1).unwrap().as_slice(), &[0, 1]);
}

#[test]
fn edge_subgraph_relabels_both_sides() {
    let g = sample_graph();
    let sub = g
        .edge_subgraph(&IdArray::from_vec(vec![0, 3]), false)
        .unwrap();
    assert_eq!(sub.induced_vertices[0].as_slice(), &[0, 2]);
    assert_eq!(sub.induced_vertices[1].as_slice(), &[1, 3]);
    assert_eq!(sub.induced_edges[0].as_slice(), &[0, 3]);
    let edges = sub.graph.edges(EdgeOrder::Eid).unwrap();
    assert_eq!(edges.src.as_slice(), &[0, 1]);
    assert_eq!(edges.dst.as_slice(), &[0, 1]);
    assert_eq!(sub.graph.num_vertices(0).unwrap(), 2);
    assert_eq!(sub.graph.num_vertices(1).unwrap(), 2);
}

#[test]
fn edge_subgraph_preserving_all_edges_is_isomorphic() {
    let g = sample_graph();
    let all = IdArray::from_vec(vec![0, 1, 2, 3]);
    let sub = g.edge_subgraph(&all, true).unwrap();
    assert_eq!(sub.graph.num_vertices(0).unwrap(), 3);
    assert_eq!(sub.graph.num_vertices(1).unwrap(), 4);
    let a = g.edges(EdgeOrder::Eid).unwrap();
    let b = sub.graph.edges(EdgeOrder::Eid).unwrap();
    assert_eq!(a.src, b.src);
    assert_eq!(a.dst, b.dst);
    assert_eq!(sub.induced_vertices[0].as_slice(), &[0, 1, 2]);
    assert_eq!(sub.induced_vertices[1].as_slice(), &[0, 1, 2, 3]);
}

#[test]
fn vertex_subgraph_with_full_ranges_is_the_original() {
    let g = sample_graph();
    let sub = g
        .vertex_subgraph(
            &IdArray::from_vec(vec![0, 1, 2]),
            &IdArray::from_vec(vec![0, 1, 2, 3]),
        )
        .unwrap();
    let a = g.edges(EdgeOrder::SrcDst).unwrap();
    let b = sub.graph.edges(EdgeOrder::SrcDst).unwrap();
    assert_eq!(a.src, b.src);
    assert_eq!(a.dst, b.dst);
    assert_eq!(sub.induced_edges[0].as_slice(), &[0, 1, 2, 3]);
}

#[test]
fn vertex_subgraph_keeps_selected_edges_only() {
    let g = sample_graph();
    let sub = g
        .vertex_subgraph(&IdArray::from_vec(vec![0]), &IdArray::from_vec(vec![2, 1]))
        .unwrap();
    // vertex 0's edges into {1, 2}, with dsts relabeled to list positions
    let edges = sub.graph.edges(EdgeOrder::SrcDst).unwrap();
    assert_eq!(edges.src.as_slice(), &[0, 0]);
    assert_eq!(edges.dst.as_slice(), &[1, 0]);
    assert_eq!(sub.induced_edges[0].as_slice(), &[0, 1]);
}

/// Meta A -> B -> C with the edge sets of the heterograph scenario.
fn chain_graph() -> Heterograph {
    let meta = Arc::new(MetaGraph::new(3, vec![(0, 1), (1, 2)]).unwrap());
    let ab = Bipartite::from_coo(
        1,
        2,
        IdArray::from_vec(vec![0, 0]),
        IdArray::from_vec(vec![0, 1]),
    )
    .unwrap();
    let bc = Bipartite::from_coo(
        2,
        2,
        IdArray::from_vec(vec![1, 1]),
        IdArray::from_vec(vec![0, 1]),
    )
    .unwrap();
    Heterograph::new(meta, vec![Arc::new(ab), Arc::new(bc)]).unwrap()
}

#[test]
fn hetero_edge_subgraph_shares_vertex_space() {
    let g = chain_graph();
    let sub = g
        .edge_subgraph(
            &[IdArray::from_vec(vec![0]), IdArray::from_vec(vec![0])],
            false,
        )
        .unwrap();
    // A->B keeps (0, 0) and B->C keeps (1, 0): type B must keep both
    // endpoint vertices in one id space
    assert_eq!(sub.induced_vertices[1].as_slice(), &[0, 1]);
    assert_eq!(sub.graph.num_vertices(1).unwrap(), 2);
    let ab = sub.graph.edges(0, EdgeOrder::Eid).unwrap();
    assert_eq!(ab.src.as_slice(), &[0]);
    assert_eq!(ab.dst.as_slice(), &[0]);
    let bc = sub.graph.edges(1, EdgeOrder::Eid).unwrap();
    assert_eq!(bc.src.as_slice(), &[1]);
    assert_eq!(bc.dst.as_slice(), &[0]);
}

#[test]
fn hetero_edge_subgraph_preserving_nodes_keeps_full_ranges() {
    let g = chain_graph();
    let sub = g
        .edge_subgraph(
            &[IdArray::from_vec(vec![1]), IdArray::from_vec(vec![0])],
            true,
        )
        .unwrap();
    assert_eq!(sub.graph.num_vertices(0).unwrap(), 1);
    assert_eq!(sub.graph.num_vertices(1).unwrap(), 2);
    assert_eq!(sub.graph.num_vertices(2).unwrap(), 2);
    assert_eq!(sub.induced_vertices[1].as_slice(), &[0, 1]);
    let ab = sub.graph.edges(0, EdgeOrder::Eid).unwrap();
    assert_eq!(ab.src.as_slice(), &[0]);
    assert_eq!(ab.dst.as_slice(), &[1]);
}

#[test]
fn hetero_mutations_are_rejected() {
    let g = chain_graph();
    assert!(g.is_readonly());
    assert_eq!(g.add_vertices(0, 1), Err(GraphError::Immutable));
    assert_eq!(g.add_edge(0, 0, 0), Err(GraphError::Immutable));
    assert_eq!(g.clear(), Err(GraphError::Immutable));
}

#[test]
fn hetero_vertex_counts_agree_across_relations() {
    let g = chain_graph();
    // type B is the dst of relation 0 and the src of relation 1
    assert_eq!(g.num_vertices(1).unwrap(), 2);
    assert_eq!(g.relation(0).unwrap().num_vertices(1).unwrap(), 2);
    assert_eq!(g.relation(1).unwrap().num_vertices(0).unwrap(), 2);
    assert!(matches!(g.num_vertices(9), Err(GraphError::BadVertexType(9))));
}
