// Matching engine: lexical/embedding similarity, fit breakdown, batch ranking
// and evidence selection. Only `embedding_client` touches the network.

pub mod evidence;
pub mod fit;
pub mod handlers;
pub mod ranking;
pub mod scorer;
pub mod skills;
pub mod text;
pub mod vector;
