use tessera_core::{CellState, DenseIndex};
use yew::prelude::*;

#[derive(Properties, Clone, PartialEq)]
pub(crate) struct CellProps {
    pub index: DenseIndex,
    pub cell: CellState,
    #[prop_or_default]
    pub selected: bool,
    /// Highlighted as a possible destination.
    #[prop_or_default]
    pub target: bool,
    pub callback: Callback<DenseIndex>,
}

#[function_component(CellView)]
pub(crate) fn cell_component(props: &CellProps) -> Html {
    let CellProps {
        index,
        cell,
        selected,
        target,
        callback,
    } = props.clone();

    let mut class = classes!(
        "cell",
        match cell {
            CellState::Unplayable => classes!("void"),
            CellState::Empty => classes!("empty"),
            CellState::Occupied(piece) => classes!("piece", piece.mark.piece_type()),
        }
    );
    if selected {
        class.push("selected");
    }
    if target {
        class.push("target");
    }

    let style = cell
        .piece()
        .map(|piece| format!("background-color: {}", piece.mark.color()));
    let label = cell
        .piece()
        .and_then(|piece| piece.height)
        .map(|height| height.to_string())
        .unwrap_or_default();

    let onclick = Callback::from(move |_: MouseEvent| {
        log::trace!("{:?} clicked", index);
        callback.emit(index);
    });

    html! {
        <td {class} {style} {onclick}>{label}</td>
    }
}
