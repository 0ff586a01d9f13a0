/*!

How ranks move when a judge reorders candidates.

## Rank slots

A judge fills up to `MAX_RANKS` (5) slots. Two candidates never share a slot, and
the slots in use are normally `1`, `2`, ... `k` without holes.

## Selecting a candidate

Selecting an unranked candidate gives it the lowest free slot. Once all the slots
are taken, the remaining candidates are disabled and selecting them does nothing.

## Choosing a rank from the menu

The menu offers `Remove Rank`, `1st`, `2nd`, `3rd`, `4th`, `5th`.

* `Remove Rank` clears the rank of this candidate only. The other candidates keep
  their slots, which may leave a hole until the next selection fills it.
* Choosing the rank the candidate already holds does nothing.
* Choosing a free slot simply moves the candidate there.
* Choosing a slot that is taken moves the holder and its neighbours by one slot
  until a free slot is reached:
  - a candidate moving to a better (lower) rank pushes the holders of
    `new, new + 1, ...` one slot further;
  - a candidate moving to a worse (higher) rank, or entering the ranking, pulls
    the holders of `new, new - 1, ...` one slot closer to the top. A holder
    pulled past the first slot leaves the ranking.

## Example

With A to E ranked 1st to 5th in order:

| operation      | A | B | C | D | E |
|----------------|---|---|---|---|---|
| start          | 1 | 2 | 3 | 4 | 5 |
| move A to 5th  | 5 | 1 | 2 | 3 | 4 |
| move A to 1st  | 1 | 2 | 3 | 4 | 5 |
| remove C       | 1 | 2 | - | 4 | 5 |

## Saving

Every change is sent to the server with the full list of candidates. The save
is not awaited and a failed save does not undo the local change: the page and
the server disagree until the next reload.

 */
